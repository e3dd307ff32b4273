//! Host header → tenant resolution.

use crate::tenant::Tenant;

/// Maps a request host to a [`Tenant`] using per-tenant domain allow-lists.
///
/// A host belongs to a tenant when it equals one of the tenant's domains or
/// is a subdomain of it. STAM domains are checked first. Hosts matching
/// neither list resolve to `default_tenant`; resolution never fails.
#[derive(Debug, Clone)]
pub struct HostResolver {
    stam_domains: Vec<String>,
    weokto_domains: Vec<String>,
    default_tenant: Tenant,
}

impl HostResolver {
    /// Build a resolver. Domains are normalised like hosts; an empty list
    /// falls back to the tenant's [`Tenant::default_domain`].
    pub fn new<S, W>(stam_domains: S, weokto_domains: W, default_tenant: Tenant) -> Self
    where
        S: IntoIterator,
        S::Item: AsRef<str>,
        W: IntoIterator,
        W::Item: AsRef<str>,
    {
        Self {
            stam_domains: domain_list(stam_domains, Tenant::Stam),
            weokto_domains: domain_list(weokto_domains, Tenant::Weokto),
            default_tenant,
        }
    }

    pub fn default_tenant(&self) -> Tenant {
        self.default_tenant
    }

    pub fn resolve(&self, host: &str) -> Tenant {
        let host = normalize_host(host);
        if host.is_empty() {
            return self.default_tenant;
        }
        if self.stam_domains.iter().any(|d| matches_domain(&host, d)) {
            return Tenant::Stam;
        }
        if self.weokto_domains.iter().any(|d| matches_domain(&host, d)) {
            return Tenant::Weokto;
        }
        self.default_tenant
    }
}

impl Default for HostResolver {
    fn default() -> Self {
        Self::new(Vec::<String>::new(), Vec::<String>::new(), Tenant::Weokto)
    }
}

fn domain_list<I>(domains: I, tenant: Tenant) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let list: Vec<String> = domains
        .into_iter()
        .map(|d| normalize_host(d.as_ref()))
        .filter(|d| !d.is_empty())
        .collect();
    if list.is_empty() {
        vec![tenant.default_domain().to_owned()]
    } else {
        list
    }
}

/// Lowercase, drop the port, a trailing dot and a leading `www.`.
pub fn normalize_host(host: &str) -> String {
    let host = host.trim().to_ascii_lowercase();
    let host = match host.strip_prefix('[') {
        // IPv6 literal: keep what is inside the brackets.
        Some(rest) => rest.split(']').next().unwrap_or_default().to_owned(),
        None => host.split(':').next().unwrap_or_default().to_owned(),
    };
    let host = host.trim_end_matches('.');
    host.strip_prefix("www.").unwrap_or(host).to_owned()
}

fn matches_domain(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|sub| sub.ends_with('.'))
}
