//! Group-based visibility filtering.

// std
use std::collections::{HashMap, HashSet};
// self
use crate::model::{Client, ClientDetail, EVERYONE_GROUP};

/// Combine clients with their detail records and the caller's group memberships.
///
/// A client without a detail record (including one whose detail fetch failed) is
/// treated as unrestricted. Invisible clients are dropped entirely, and the
/// remainder is sorted by lowercased name; ties keep their original relative order.
pub fn apply_group_access(
	clients: Vec<Client>,
	details: &HashMap<String, ClientDetail>,
	caller_group_ids: &HashSet<String>,
) -> Vec<Client> {
	let mut visible = clients
		.into_iter()
		.map(|client| {
			let detail = details.get(&client.id);

			annotate_access(client, detail, caller_group_ids)
		})
		.filter(|client| client.has_access)
		.collect::<Vec<_>>();

	visible.sort_by_cached_key(|client| client.name.to_lowercase());

	visible
}

fn annotate_access(
	mut client: Client,
	detail: Option<&ClientDetail>,
	caller_group_ids: &HashSet<String>,
) -> Client {
	let Some(detail) = detail else {
		return unrestricted(client);
	};

	// Detail endpoints have carried callback URLs the list endpoint dropped.
	if client.callback_urls.is_empty() {
		client.callback_urls = detail.callback_urls.clone();
	}

	if !detail.is_restricted() {
		return unrestricted(client);
	}

	let allowed_group_ids =
		detail.allowed_user_groups.iter().map(|group| group.id.as_str()).collect::<HashSet<_>>();

	client.access_groups =
		detail.allowed_user_groups.iter().map(|group| group.display_name().to_string()).collect();
	client.restricted_access = true;
	client.has_access = caller_group_ids.iter().any(|id| allowed_group_ids.contains(id.as_str()));

	if !client.has_access {
		tracing::debug!(client = %client.id, name = %client.name, "caller lacks access to client");
	}

	client
}

fn unrestricted(mut client: Client) -> Client {
	client.access_groups = vec![EVERYONE_GROUP.to_string()];
	client.restricted_access = false;
	client.has_access = true;

	client
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::model::UserGroup;

	fn client(id: &str, name: &str) -> Client {
		Client {
			id: id.into(),
			client_id: id.into(),
			name: name.into(),
			description: String::new(),
			is_public: false,
			has_logo: false,
			logo_url: None,
			icon: None,
			callback_urls: Vec::new(),
			access_groups: vec![EVERYONE_GROUP.to_string()],
			restricted_access: false,
			has_access: true,
		}
	}

	fn group(id: &str, name: &str, friendly: Option<&str>) -> UserGroup {
		UserGroup { id: id.into(), name: name.into(), friendly_name: friendly.map(Into::into) }
	}

	fn detail(groups: Vec<UserGroup>) -> ClientDetail {
		ClientDetail { allowed_user_groups: groups, ..Default::default() }
	}

	fn caller(ids: &[&str]) -> HashSet<String> {
		ids.iter().map(ToString::to_string).collect()
	}

	#[test]
	fn restricted_client_visible_only_on_group_intersection() {
		let details = HashMap::from([
			("a".to_string(), detail(vec![group("g2", "ops", None)])),
			("c".to_string(), detail(vec![group("g1", "eng", None), group("g3", "qa", None)])),
		]);
		let clients = vec![client("a", "Alpha"), client("b", "Beta"), client("c", "Gamma")];
		let visible = apply_group_access(clients, &details, &caller(&["g1"]));
		let names = visible.iter().map(|c| c.name.as_str()).collect::<Vec<_>>();

		assert_eq!(names, ["Beta", "Gamma"]);
		assert!(visible[1].restricted_access);
		assert_eq!(visible[1].access_groups, ["eng", "qa"]);
	}

	#[test]
	fn empty_allowed_groups_means_unrestricted() {
		let details = HashMap::from([("a".to_string(), detail(Vec::new()))]);
		let visible = apply_group_access(vec![client("a", "Alpha")], &details, &caller(&[]));

		assert_eq!(visible.len(), 1);
		assert!(!visible[0].restricted_access);
		assert_eq!(visible[0].access_groups, [EVERYONE_GROUP]);
	}

	#[test]
	fn missing_detail_means_unrestricted() {
		let visible =
			apply_group_access(vec![client("a", "Alpha")], &HashMap::new(), &caller(&[]));

		assert_eq!(visible.len(), 1);
		assert!(visible[0].has_access);
	}

	#[test]
	fn denied_clients_are_dropped_not_flagged() {
		let details = HashMap::from([("a".to_string(), detail(vec![group("g2", "ops", None)]))]);
		let visible = apply_group_access(vec![client("a", "Alpha")], &details, &caller(&["g1"]));

		assert!(visible.is_empty());
	}

	#[test]
	fn access_groups_prefer_friendly_names() {
		let details = HashMap::from([(
			"a".to_string(),
			detail(vec![group("g1", "eng", Some("Engineering")), group("g2", "ops", None)]),
		)]);
		let visible = apply_group_access(vec![client("a", "Alpha")], &details, &caller(&["g1"]));

		assert_eq!(visible[0].access_groups, ["Engineering", "ops"]);
	}

	#[test]
	fn sort_is_case_insensitive_and_stable() {
		let clients = vec![
			client("1", "zeta"),
			client("2", "Alpha"),
			client("3", "beta"),
			client("4", "ALPHA"),
		];
		let visible = apply_group_access(clients, &HashMap::new(), &caller(&[]));
		let order = visible.iter().map(|c| c.id.as_str()).collect::<Vec<_>>();

		// "Alpha" (id 2) precedes "ALPHA" (id 4) because ties keep input order.
		assert_eq!(order, ["2", "4", "3", "1"]);
	}

	#[test]
	fn detail_callbacks_fill_empty_client_list() {
		let mut with_detail = detail(Vec::new());

		with_detail.callback_urls = vec!["https://app/cb".to_string()];

		let details = HashMap::from([("a".to_string(), with_detail)]);
		let visible = apply_group_access(vec![client("a", "Alpha")], &details, &caller(&[]));

		assert_eq!(visible[0].callback_urls, ["https://app/cb"]);
	}

	#[test]
	fn detail_callbacks_do_not_override_populated_list() {
		let mut existing = client("a", "Alpha");

		existing.callback_urls = vec!["https://app/original".to_string()];

		let mut with_detail = detail(Vec::new());

		with_detail.callback_urls = vec!["https://app/other".to_string()];

		let details = HashMap::from([("a".to_string(), with_detail)]);
		let visible = apply_group_access(vec![existing], &details, &caller(&[]));

		assert_eq!(visible[0].callback_urls, ["https://app/original"]);
	}
}
