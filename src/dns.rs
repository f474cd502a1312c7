use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::TokioAsyncResolver;

use log::debug;

use crate::constants::SRV_NAME_PREFIX;

/// Best effort discovery of alternate autodiscover domains through SRV
/// records.
pub struct DnsExpander {
    resolver: TokioAsyncResolver,
}

impl DnsExpander {
    pub fn new() -> Self {
        Self::with_resolver(TokioAsyncResolver::tokio(
            ResolverConfig::default(),
            ResolverOpts::default(),
        ))
    }

    pub(crate) fn with_resolver(resolver: TokioAsyncResolver) -> Self {
        Self { resolver }
    }

    /// Looks up the `_autodiscover._tcp` service records of a domain and
    /// returns their targets in resolver order, priority and weight are
    /// ignored. Any lookup failure degrades to an empty list so the caller
    /// always keeps its original candidate domain.
    pub async fn expand<D: AsRef<str>>(&self, domain: D) -> Vec<String> {
        let name = format!("{}.{}", SRV_NAME_PREFIX, domain.as_ref());

        match self.resolver.srv_lookup(name.as_str()).await {
            Ok(lookup) => lookup
                .iter()
                .map(|record| record.target().to_string().trim_matches('.').to_string())
                .collect(),
            Err(error) => {
                debug!("Srv lookup for {} failed: {}", name, error);

                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod test {
    use hickory_resolver::config::{ResolverConfig, ResolverOpts};
    use hickory_resolver::TokioAsyncResolver;

    use super::DnsExpander;

    #[tokio::test]
    async fn degrades_to_empty_when_the_lookup_fails() {
        // A resolver without any nameservers fails every lookup.
        let resolver =
            TokioAsyncResolver::tokio(ResolverConfig::new(), ResolverOpts::default());

        let expander = DnsExpander::with_resolver(resolver);

        assert!(expander.expand("example.com").await.is_empty());
    }
}
