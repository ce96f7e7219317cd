use crate::registry::{Client, Project};

/// How a client was attributed to a meeting. Domain evidence outranks keyword
/// evidence wherever both are available.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClientMatch {
	Domain,
	Keyword,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectMatch {
	Keyword,
	SoleActive,
}

/// First active client whose registered domains intersect the external
/// attendee domains, in the provided client order.
pub fn find_client_by_domain<'a>(
	external_domains: &[String],
	clients: &'a [Client],
) -> Option<&'a Client> {
	clients.iter().filter(|client| client.is_active()).find(|client| {
		client.domains.iter().any(|registered| {
			let registered = registered.trim().to_ascii_lowercase();

			!registered.is_empty() && external_domains.iter().any(|domain| *domain == registered)
		})
	})
}

/// First active client with a keyword that appears in the meeting title,
/// case-insensitively.
pub fn find_client_by_keyword<'a>(title: &str, clients: &'a [Client]) -> Option<&'a Client> {
	let title = title.to_lowercase();

	clients
		.iter()
		.filter(|client| client.is_active())
		.find(|client| keyword_hit(&title, &client.keywords))
}

/// Project resolution for an already-resolved client: a keyword hit against
/// title+description wins; failing that, a client with exactly one active
/// project defaults to it; otherwise no project is assigned.
pub fn resolve_project<'a>(
	client: &Client,
	title: &str,
	description: Option<&str>,
	projects: &'a [Project],
) -> Option<(&'a Project, ProjectMatch)> {
	let owned: Vec<&Project> = projects
		.iter()
		.filter(|project| project.is_active() && project.client_id == client.id)
		.collect();
	let haystack = match description {
		Some(description) => format!("{title}\n{description}").to_lowercase(),
		None => title.to_lowercase(),
	};

	if let Some(project) = owned.iter().find(|project| keyword_hit(&haystack, &project.keywords)) {
		return Some((*project, ProjectMatch::Keyword));
	}
	if let [only] = owned.as_slice() {
		return Some((*only, ProjectMatch::SoleActive));
	}

	None
}

fn keyword_hit(haystack: &str, keywords: &[String]) -> bool {
	keywords.iter().any(|keyword| {
		let keyword = keyword.trim().to_lowercase();

		!keyword.is_empty() && haystack.contains(&keyword)
	})
}
