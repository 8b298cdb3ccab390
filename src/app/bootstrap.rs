use url::form_urlencoded;

use crate::crawl::RunParameters;

pub(in crate::app) const TOP_K_CHOICES: [usize; 6] = [50, 100, 200, 300, 500, 1000];
pub(in crate::app) const DEFAULT_TOP_K: usize = 200;

/// Startup values read once, before the first frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BootstrapParams {
    pub seed_url: Option<String>,
    pub hop: u32,
    pub top_k: usize,
}

impl Default for BootstrapParams {
    fn default() -> Self {
        Self {
            seed_url: None,
            hop: RunParameters::DEFAULT_HOPS,
            top_k: DEFAULT_TOP_K,
        }
    }
}

/// Only the exact spelling of a listed choice counts, so `01`, `+1` and ` 2 ` are rejected.
fn parse_choice<T: Copy + ToString>(choices: &[T], raw: &str) -> Option<T> {
    choices
        .iter()
        .copied()
        .find(|choice| choice.to_string() == raw)
}

impl BootstrapParams {
    /// Reads `url`, `hop` and `topK` from a query string such as `?url=...&hop=1`.
    /// Values outside the allowed choices keep their defaults.
    pub fn from_query(query: &str) -> Self {
        let query = query.trim().trim_start_matches('?');
        let mut params = Self::default();

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "url" => params.set_seed_url(&value),
                "hop" => params.set_hop(&value),
                "topK" => params.set_top_k(&value),
                _ => {}
            }
        }
        params
    }

    pub fn set_seed_url(&mut self, raw: &str) {
        let raw = raw.trim();
        self.seed_url = (!raw.is_empty()).then(|| raw.to_owned());
    }

    pub fn set_hop(&mut self, raw: &str) {
        self.hop =
            parse_choice(&RunParameters::HOP_CHOICES, raw).unwrap_or(RunParameters::DEFAULT_HOPS);
    }

    pub fn set_top_k(&mut self, raw: &str) {
        self.top_k = parse_choice(&TOP_K_CHOICES, raw).unwrap_or(DEFAULT_TOP_K);
    }

    /// A seed on the command line means the first run starts without a click.
    pub fn autorun(&self) -> bool {
        self.seed_url.is_some()
    }

    pub(in crate::app) fn initial_run_parameters(&self) -> RunParameters {
        let seed = self
            .seed_url
            .clone()
            .unwrap_or_else(|| RunParameters::DEFAULT_SEED_URL.to_owned());
        RunParameters::new(seed, self.hop, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_every_known_key() {
        let params = BootstrapParams::from_query("?url=https%3A%2F%2Fa.com%2Fdocs&hop=3&topK=50");
        assert_eq!(params.seed_url.as_deref(), Some("https://a.com/docs"));
        assert_eq!(params.hop, 3);
        assert_eq!(params.top_k, 50);
        assert!(params.autorun());
    }

    #[test]
    fn absent_values_use_defaults_and_do_not_autorun() {
        let params = BootstrapParams::from_query("");
        assert_eq!(params, BootstrapParams::default());
        assert_eq!(params.hop, 2);
        assert_eq!(params.top_k, 200);
        assert!(!params.autorun());
        assert_eq!(
            params.initial_run_parameters().seed_url,
            RunParameters::DEFAULT_SEED_URL
        );
    }

    #[test]
    fn values_outside_the_choices_fall_back() {
        for query in [
            "hop=0&topK=10",
            "hop=4&topK=201",
            "hop=two&topK=",
            "hop=-1&topK=1e3",
            "hop=01&topK=050",
            "hop=%2B1&topK=%2B50",
            "hop=%202%20&topK=%2050",
        ] {
            let params = BootstrapParams::from_query(query);
            assert_eq!(params.hop, 2, "hop from {query}");
            assert_eq!(params.top_k, 200, "topK from {query}");
        }
    }

    #[test]
    fn every_listed_choice_is_accepted() {
        for hop in RunParameters::HOP_CHOICES {
            assert_eq!(BootstrapParams::from_query(&format!("hop={hop}")).hop, hop);
        }
        for top_k in TOP_K_CHOICES {
            assert_eq!(BootstrapParams::from_query(&format!("topK={top_k}")).top_k, top_k);
        }
    }

    #[test]
    fn overrides_match_choices_literally() {
        let mut params = BootstrapParams::from_query("hop=3&topK=50");
        params.set_hop(" 1");
        params.set_top_k("0100");
        assert_eq!(params.hop, 2);
        assert_eq!(params.top_k, 200);

        params.set_hop("1");
        params.set_top_k("100");
        assert_eq!(params.hop, 1);
        assert_eq!(params.top_k, 100);
    }

    #[test]
    fn blank_url_does_not_autorun() {
        let params = BootstrapParams::from_query("url=%20%20&hop=1");
        assert_eq!(params.seed_url, None);
        assert!(!params.autorun());
        assert_eq!(params.hop, 1);
    }

    #[test]
    fn later_overrides_replace_query_values() {
        let mut params = BootstrapParams::from_query("url=https://a.com&hop=1&topK=50");
        params.set_seed_url("https://b.com");
        params.set_top_k("1000");

        let run = params.initial_run_parameters();
        assert_eq!(run.seed_url, "https://b.com");
        assert_eq!(run.max_hops, 1);
        assert_eq!(params.top_k, 1000);
        assert!(!run.same_domain_only);
    }
}
