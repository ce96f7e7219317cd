use crate::classification::ClassificationType;

/// Deterministic folder suggestion for a classification. This is a string
/// template only; resolving it to an actual drive folder is the caller's
/// concern.
pub fn suggested_folder_path(
	classification: ClassificationType,
	client_name: Option<&str>,
	project_name: Option<&str>,
	internal_team: Option<&str>,
) -> String {
	match classification {
		ClassificationType::Client => {
			let mut path = "Meeting Notes/Clients".to_string();

			if let Some(client) = client_name.map(str::trim).filter(|name| !name.is_empty()) {
				path.push('/');
				path.push_str(client);
			}
			if let Some(project) = project_name.map(str::trim).filter(|name| !name.is_empty()) {
				path.push('/');
				path.push_str(project);
			}

			path
		},
		ClassificationType::Internal => {
			let team = internal_team.map(str::trim).filter(|team| !team.is_empty());

			format!("Meeting Notes/Internal/{}", team.unwrap_or("General"))
		},
		ClassificationType::External => "Meeting Notes/External".to_string(),
		ClassificationType::Personal => "Meeting Notes/Personal".to_string(),
		ClassificationType::Uncategorized => "Meeting Notes/Unsorted".to_string(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn client_path_includes_client_and_project() {
		assert_eq!(
			suggested_folder_path(
				ClassificationType::Client,
				Some("Acme Corp"),
				Some("Data Platform"),
				None,
			),
			"Meeting Notes/Clients/Acme Corp/Data Platform",
		);
		assert_eq!(
			suggested_folder_path(ClassificationType::Client, Some("Acme Corp"), None, None),
			"Meeting Notes/Clients/Acme Corp",
		);
	}

	#[test]
	fn internal_path_defaults_to_general() {
		assert_eq!(
			suggested_folder_path(ClassificationType::Internal, None, None, Some("Engineering")),
			"Meeting Notes/Internal/Engineering",
		);
		assert_eq!(
			suggested_folder_path(ClassificationType::Internal, None, None, None),
			"Meeting Notes/Internal/General",
		);
	}

	#[test]
	fn terminal_types_have_fixed_paths() {
		assert_eq!(
			suggested_folder_path(ClassificationType::Uncategorized, None, None, None),
			"Meeting Notes/Unsorted",
		);
		assert_eq!(
			suggested_folder_path(ClassificationType::External, None, None, None),
			"Meeting Notes/External",
		);
	}
}
