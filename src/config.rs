use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,

    // Content store
    pub sanity_project_id: String,
    pub sanity_dataset: String,
    pub sanity_api_version: String,
    pub sanity_api_token: String,
    pub sanity_api_host: Option<String>,

    // Identity provider
    pub clerk_secret_key: String,
    pub clerk_jwt_key: String,
    pub clerk_api_url: String,

    // Uploads
    pub max_image_size: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),

            // Content store
            sanity_project_id: env::var("SANITY_PROJECT_ID")?,
            sanity_dataset: env::var("SANITY_DATASET")
                .unwrap_or_else(|_| "production".to_string()),
            sanity_api_version: env::var("SANITY_API_VERSION")
                .unwrap_or_else(|_| "2025-01-01".to_string()),
            sanity_api_token: env::var("SANITY_API_TOKEN")?,
            sanity_api_host: env::var("SANITY_API_HOST").ok(),

            // Identity provider
            clerk_secret_key: env::var("CLERK_SECRET_KEY")?,
            clerk_jwt_key: env::var("CLERK_JWT_KEY")?,
            clerk_api_url: env::var("CLERK_API_URL")
                .unwrap_or_else(|_| "https://api.clerk.com".to_string()),

            max_image_size: env::var("MAX_IMAGE_SIZE")
                .unwrap_or_else(|_| "5242880".to_string()) // 5MB default
                .parse()
                .unwrap_or(5242880),
        })
    }

    /// Base URL of the content store API, including the version segment.
    pub fn content_api_url(&self) -> String {
        let host = self
            .sanity_api_host
            .clone()
            .unwrap_or_else(|| format!("https://{}.api.sanity.io", self.sanity_project_id));

        format!(
            "{}/v{}",
            host.trim_end_matches('/'),
            self.sanity_api_version
        )
    }
}
