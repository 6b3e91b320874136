// ── Site selection ──
//
// Resolves the operator's description filter against the controller's
// site list. Runs once at startup; the result is the fixed working set.

use tracing::debug;

use crate::error::CoreError;
use crate::model::Site;
use crate::session::SessionProvider;

/// Fetch every site the configured user can see, in controller order.
pub async fn discover_sites(session: &SessionProvider) -> Result<Vec<Site>, CoreError> {
    let handle = session.acquire().await?;
    let sites: Vec<Site> = handle
        .client()
        .list_sites()
        .await?
        .into_iter()
        .map(Site::from)
        .collect();
    debug!(count = sites.len(), "discovered sites");
    Ok(sites)
}

/// Narrow `all` to the sites matching `filter`.
///
/// An empty filter keeps every site in controller order. Otherwise the
/// first site whose description equals `filter` exactly (case-sensitive)
/// is the whole working set; no match is an error.
pub fn select_sites(filter: &str, all: Vec<Site>) -> Result<Vec<Site>, CoreError> {
    if filter.is_empty() {
        return Ok(all);
    }

    all.into_iter()
        .find(|site| site.description == filter)
        .map(|site| vec![site])
        .ok_or_else(|| CoreError::SiteNotFound {
            description: filter.to_owned(),
        })
}

/// Comma-separated site descriptions, for log lines.
pub fn sites_string(sites: &[Site]) -> String {
    sites
        .iter()
        .map(|s| s.description.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn site(id: &str, description: &str) -> Site {
        Site {
            id: id.into(),
            name: format!("s{id}"),
            description: description.into(),
        }
    }

    fn home_and_office() -> Vec<Site> {
        vec![site("1", "Home"), site("2", "Office")]
    }

    #[test]
    fn exact_match_returns_single_site() {
        let selected = select_sites("Home", home_and_office()).expect("match");
        assert_eq!(selected, vec![site("1", "Home")]);
    }

    #[test]
    fn empty_filter_keeps_all_in_order() {
        let all = vec![site("3", "Lab"), site("1", "Home"), site("2", "Office")];
        let selected = select_sites("", all.clone()).expect("all");
        assert_eq!(selected, all);
    }

    #[test]
    fn unmatched_filter_fails() {
        for filter in ["Garage", "home", "Home ", "Off"] {
            let err = select_sites(filter, home_and_office()).expect_err(filter);
            assert!(
                matches!(err, CoreError::SiteNotFound { ref description } if description == filter),
                "got: {err:?}"
            );
        }
    }

    #[test]
    fn first_match_wins_on_duplicates() {
        let all = vec![site("1", "Home"), site("2", "Home")];
        let selected = select_sites("Home", all).expect("match");
        assert_eq!(selected[0].id, "1");
        assert_eq!(selected.len(), 1);
    }

    #[test]
    fn sites_string_joins_descriptions() {
        assert_eq!(sites_string(&home_and_office()), "Home, Office");
        assert_eq!(sites_string(&[]), "");
    }
}
