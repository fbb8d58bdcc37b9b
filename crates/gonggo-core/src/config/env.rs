use super::Config;

impl Config {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("GONGGO_KINTEL_URL") {
            self.client.kintel_url = v;
        }
        if let Ok(v) = std::env::var("GONGGO_MODELS_URL") {
            self.client.models_url = v;
        }
        if let Ok(v) = std::env::var("GONGGO_STORE_PATH") {
            self.store.path = v;
        }
        if let Ok(v) = std::env::var("GONGGO_TIMEOUT_PARSE")
            && let Ok(secs) = v.parse::<u64>()
        {
            self.timeouts.parse_seconds = secs;
        }
        if let Ok(v) = std::env::var("GONGGO_TIMEOUT_SUMMARY")
            && let Ok(secs) = v.parse::<u64>()
        {
            self.timeouts.summary_seconds = secs;
        }
        if let Ok(v) = std::env::var("GONGGO_TIMEOUT_REQUEST")
            && let Ok(secs) = v.parse::<u64>()
        {
            self.timeouts.request_seconds = secs;
        }
        if let Ok(v) = std::env::var("GONGGO_CHUNK_SIZE") {
            match v.parse::<usize>() {
                Ok(size) => self.chunking.chunk_size = size,
                Err(_) => tracing::warn!("ignoring invalid GONGGO_CHUNK_SIZE value: {v}"),
            }
        }
        if let Ok(v) = std::env::var("GONGGO_MAX_FILE_SIZE")
            && let Ok(bytes) = v.parse::<u64>()
        {
            self.limits.max_file_size = bytes;
        }
        if let Ok(v) = std::env::var("GONGGO_FAQ_RETRY_DELAY")
            && let Ok(secs) = v.parse::<u64>()
        {
            self.faq.retry_delay_seconds = secs;
        }
        self.apply_env_overrides_gateway();
    }

    fn apply_env_overrides_gateway(&mut self) {
        if let Ok(v) = std::env::var("GONGGO_GATEWAY_BIND") {
            self.gateway.bind = v;
        }
        if let Ok(v) = std::env::var("GONGGO_GATEWAY_PORT")
            && let Ok(port) = v.parse::<u16>()
        {
            self.gateway.port = port;
        }
        if let Ok(v) = std::env::var("GONGGO_GATEWAY_MAX_BODY")
            && let Ok(size) = v.parse::<usize>()
        {
            self.gateway.max_body_size = size;
        }
        if let Ok(v) = std::env::var("GONGGO_KINTEL_UPSTREAM") {
            self.gateway.kintel_upstream = v;
        }
        if let Ok(v) = std::env::var("GONGGO_MODELS_UPSTREAM") {
            self.gateway.models_upstream = v;
        }
        if let Ok(v) = std::env::var("GONGGO_FAQ_UPSTREAM") {
            self.gateway.faq_upstream = v;
        }
    }
}
