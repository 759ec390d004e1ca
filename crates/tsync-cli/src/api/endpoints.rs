//! Graph endpoint URL builders
//!
//! Ids are percent-encoded as path segments. Query strings are added by the
//! client.

use urlencoding::encode;

/// Site search URL; used with `search=*` to list every site
pub fn sites_url(base_url: &str) -> String {
    format!("{}/sites", base_url)
}

/// Single site URL
pub fn site_url(base_url: &str, site_id: &str) -> String {
    format!("{}/sites/{}", base_url, encode(site_id))
}

/// Lists of a site
pub fn lists_url(base_url: &str, site_id: &str) -> String {
    format!("{}/lists", site_url(base_url, site_id))
}

/// Single list URL
pub fn list_url(base_url: &str, site_id: &str, list_id: &str) -> String {
    format!("{}/{}", lists_url(base_url, site_id), encode(list_id))
}

/// Column definitions of a list
pub fn columns_url(base_url: &str, site_id: &str, list_id: &str) -> String {
    format!("{}/columns", list_url(base_url, site_id, list_id))
}

/// Item collection of a list
pub fn items_url(base_url: &str, site_id: &str, list_id: &str) -> String {
    format!("{}/items", list_url(base_url, site_id, list_id))
}

/// Messages of the signed-in user's inbox
pub fn inbox_messages_url(base_url: &str) -> String {
    format!("{}/me/mailFolders/inbox/messages", base_url)
}

/// Single message of the signed-in user
pub fn message_url(base_url: &str, message_id: &str) -> String {
    format!("{}/me/messages/{}", base_url, encode(message_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://graph.microsoft.com/v1.0";

    #[test]
    fn test_site_urls() {
        assert_eq!(sites_url(BASE), "https://graph.microsoft.com/v1.0/sites");
        assert_eq!(
            lists_url(BASE, "site-1"),
            "https://graph.microsoft.com/v1.0/sites/site-1/lists"
        );
        assert_eq!(
            columns_url(BASE, "site-1", "list-1"),
            "https://graph.microsoft.com/v1.0/sites/site-1/lists/list-1/columns"
        );
        assert_eq!(
            items_url(BASE, "site-1", "list-1"),
            "https://graph.microsoft.com/v1.0/sites/site-1/lists/list-1/items"
        );
    }

    #[test]
    fn test_compound_site_id_is_encoded() {
        assert_eq!(
            site_url(BASE, "contoso.sharepoint.com,abc,def"),
            "https://graph.microsoft.com/v1.0/sites/contoso.sharepoint.com%2Cabc%2Cdef"
        );
    }

    #[test]
    fn test_mail_urls() {
        assert_eq!(
            inbox_messages_url(BASE),
            "https://graph.microsoft.com/v1.0/me/mailFolders/inbox/messages"
        );
        assert_eq!(
            message_url(BASE, "AAMk/abc="),
            "https://graph.microsoft.com/v1.0/me/messages/AAMk%2Fabc%3D"
        );
    }
}
