use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityStatus {
	#[default]
	Active,
	Inactive,
}

/// A known client organization. Only active clients participate in matching.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Client {
	pub id: String,
	pub name: String,
	#[serde(default)]
	pub domains: Vec<String>,
	#[serde(default)]
	pub keywords: Vec<String>,
	#[serde(default)]
	pub status: EntityStatus,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Project {
	pub id: String,
	pub client_id: String,
	pub name: String,
	#[serde(default)]
	pub keywords: Vec<String>,
	#[serde(default)]
	pub status: EntityStatus,
}

impl Client {
	pub fn is_active(&self) -> bool {
		self.status == EntityStatus::Active
	}
}

impl Project {
	pub fn is_active(&self) -> bool {
		self.status == EntityStatus::Active
	}
}
