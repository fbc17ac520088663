/// File stem for a document id: a single path component, and distinct ids
/// never share one.
pub fn storage_key(doc_id: &str) -> String {
    format!("doc-{}", urlencoding::encode(doc_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_stay_in_one_component() {
        assert_eq!(storage_key("doc-1"), "doc-doc-1");
        assert_eq!(storage_key("../etc/passwd"), "doc-..%2Fetc%2Fpasswd");
        assert_eq!(storage_key(""), "doc-");
    }

    #[test]
    fn distinct_ids_get_distinct_keys() {
        let ids = ["paper.v1", "paper_v1", "paper v1", "paper/v1", "paper%2Fv1"];
        let keys: std::collections::HashSet<_> = ids.iter().map(|id| storage_key(id)).collect();
        assert_eq!(keys.len(), ids.len());
    }
}
