/// Anti-forgery token resolution for outbound calls.
///
/// Sources are consulted in priority order: the page-level metadata token,
/// the process-global slot, then the host platform's global. The first
/// non-empty value wins; with no source populated the resolved token is the
/// empty string and the session counts as unauthenticated.
#[derive(Debug, Clone, Default)]
pub struct CredentialContext {
    pub page_token: Option<String>,
    pub process_token: Option<String>,
    pub host_token: Option<String>,
}

impl CredentialContext {
    pub fn resolve_token(&self) -> String {
        [&self.page_token, &self.process_token, &self.host_token]
            .into_iter()
            .flatten()
            .find(|token| !token.is_empty())
            .cloned()
            .unwrap_or_default()
    }

    pub fn is_authenticated(&self) -> bool {
        !self.resolve_token().is_empty()
    }
}
