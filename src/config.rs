/// Where and how to reach the PowerDNS API.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub api_url: String, // "http://localhost:8081/api/v1"
    pub api_key: String,
    pub server_id: String, // "localhost"
}

pub const DEFAULT_API_URL: &str = "http://localhost:8081/api/v1";
pub const DEFAULT_SERVER_ID: &str = "localhost";

impl ApiConfig {
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        server_id: impl Into<String>,
    ) -> Self {
        Self {
            api_url: api_url.into(),
            api_key: api_key.into(),
            server_id: server_id.into(),
        }
    }

    /// API root without trailing slash. Accepts a bare host URL
    /// (`http://host:8081`) and appends the v1 prefix.
    pub fn api_root(&self) -> String {
        let url = self.api_url.trim_end_matches('/');
        if url.ends_with("/api/v1") {
            url.to_string()
        } else {
            format!("{url}/api/v1")
        }
    }
}
