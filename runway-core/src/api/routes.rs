macro_rules! v1_path {
    ($path:literal) => {
        concat!("/api/v1", $path)
    };
}

pub const PING: &str = "/ping";
pub const HEALTH: &str = "/health";

/// Versioned API route definitions shared by the server and its clients
pub mod v1 {
    pub const ROOT: &str = "/api/v1";
    pub const VERSION: &str = "v1";

    pub mod systems {
        pub const COLLECTION: &str = v1_path!("/systems");
        pub const ITEM: &str = v1_path!("/systems/{id}");
        pub const RUNWAY: &str = v1_path!("/systems/{id}/runway");
        pub const FORECAST: &str = v1_path!("/systems/{id}/forecast");
        pub const WHAT_IF: &str = v1_path!("/systems/{id}/what-if");
        pub const METRICS: &str = v1_path!("/systems/{id}/metrics");
    }

    pub mod pipelines {
        pub const COLLECTION: &str = v1_path!("/pipelines");
        pub const ITEM: &str = v1_path!("/pipelines/{id}");
        pub const STATUS: &str = v1_path!("/pipelines/{id}/status");
    }

    pub mod history {
        pub const COLLECTION: &str = v1_path!("/history");
    }

    pub mod live {
        pub const WEBSOCKET: &str = v1_path!("/ws");
    }
}

/// Substitute `{id}` in a route template.
pub fn with_id(template: &str, id: impl std::fmt::Display) -> String {
    template.replace("{id}", &id.to_string())
}
