//! Provider endpoint URL builders

/// Process lookup by bare CNJ number
pub fn process_by_cnj_url(base_url: &str, identifier: &str) -> String {
    format!("{}/processobycnj/{}", base_url, identifier)
}

/// Movement history of one process document within one instance
pub fn movements_url(base_url: &str, doc_code: &str, instance_code: &str) -> String {
    format!(
        "{}/movimentacaobyprocesso/{}/{}",
        base_url, doc_code, instance_code
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        assert_eq!(
            process_by_cnj_url("http://h/consilium-rest", "08188005320238140040"),
            "http://h/consilium-rest/processobycnj/08188005320238140040"
        );
        assert_eq!(
            movements_url("http://h/consilium-rest", "123", "1"),
            "http://h/consilium-rest/movimentacaobyprocesso/123/1"
        );
    }
}
