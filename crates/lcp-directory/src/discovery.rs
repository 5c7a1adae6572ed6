//! Base DN discovery.
//!
//! Servers differ in whether they publish a root DSE, allow searches based
//! at the empty DN or answer anonymous queries at all. The resolver tries an
//! ordered list of independent strategies and returns the first answer.

use tracing::{debug, info, Span};

use crate::config::{LdapConfig, SearchScope, DEFAULT_FILTER};
use crate::connection::DirectorySearch;
use crate::error::{LdapError, LdapResult};

/// Placeholder base DNs probed as a last resort, in order.
pub const WELL_KNOWN_BASE_DNS: [&str; 5] = [
    "dc=example,dc=com",
    "dc=test,dc=com",
    "dc=local",
    "dc=domain,dc=com",
    "dc=company,dc=com",
];

const NAMING_CONTEXTS: &str = "namingContexts";

/// One way of finding the base DN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiscoveryStrategy {
    /// The base DN given in the configuration.
    Configured,
    /// First `namingContexts` value of the root DSE.
    RootDseNamingContexts,
    /// First entry one level below the empty DN with a `dc` attribute.
    TopLevelDomainSearch,
    /// The `dc=` components of the bind DN, if that entry exists.
    BindDnComponents,
    /// Shortest DN of a subtree search from the empty DN.
    ShortestSubtreeDn,
    /// [`WELL_KNOWN_BASE_DNS`], first one that exists.
    WellKnownDefaults,
}

impl DiscoveryStrategy {
    /// Every strategy, most authoritative first.
    pub const ALL: [Self; 6] = [
        Self::Configured,
        Self::RootDseNamingContexts,
        Self::TopLevelDomainSearch,
        Self::BindDnComponents,
        Self::ShortestSubtreeDn,
        Self::WellKnownDefaults,
    ];

    /// Human-readable name, used in error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Configured => "configured base DN",
            Self::RootDseNamingContexts => "root DSE namingContexts",
            Self::TopLevelDomainSearch => "top-level dc search",
            Self::BindDnComponents => "bind DN dc components",
            Self::ShortestSubtreeDn => "shortest subtree DN",
            Self::WellKnownDefaults => "well-known defaults",
        }
    }

    /// Runs this strategy. `None` means it found nothing.
    pub fn attempt<S>(self, directory: &mut S, config: &LdapConfig) -> Option<String>
    where
        S: DirectorySearch + ?Sized,
    {
        match self {
            Self::Configured => Some(config.base_dn.trim())
                .filter(|dn| !dn.is_empty())
                .map(str::to_string),
            Self::RootDseNamingContexts => root_dse_naming_context(directory),
            Self::TopLevelDomainSearch => top_level_domain(directory),
            Self::BindDnComponents => {
                let candidate = dc_components(&config.bind_dn)?;
                exists(directory, &candidate).then_some(candidate)
            }
            Self::ShortestSubtreeDn => shortest_subtree_dn(directory),
            Self::WellKnownDefaults => WELL_KNOWN_BASE_DNS
                .iter()
                .find(|dn| exists(directory, dn))
                .map(|dn| (*dn).to_string()),
        }
    }
}

fn root_dse_naming_context<S>(directory: &mut S) -> Option<String>
where
    S: DirectorySearch + ?Sized,
{
    let root = directory
        .search("", SearchScope::Base, DEFAULT_FILTER, &["*", NAMING_CONTEXTS])
        .into_iter()
        .next()?;

    let context = root
        .get_attr(NAMING_CONTEXTS)
        .filter(|dn| !dn.is_empty())
        .map(str::to_string);
    if context.is_none() {
        let available: Vec<&str> = root.attributes.keys().map(String::as_str).collect();
        debug!(?available, "Root DSE has no namingContexts");
    }
    context
}

fn top_level_domain<S>(directory: &mut S) -> Option<String>
where
    S: DirectorySearch + ?Sized,
{
    match directory.try_search("", SearchScope::OneLevel, "(dc=*)", &[]) {
        Ok(entries) => entries.into_iter().map(|e| e.dn).find(|dn| !dn.is_empty()),
        Err(e) if e.is_no_such_object() => {
            info!("Server does not allow searches based at the empty DN");
            None
        }
        Err(e) => {
            debug!(error = %e, "Top-level dc search failed");
            None
        }
    }
}

/// The `dc=` components of `dn`, in order, or `None` if there are none.
#[must_use]
pub fn dc_components(dn: &str) -> Option<String> {
    let parts: Vec<&str> = dn
        .split(',')
        .map(str::trim)
        .filter(|part| part.get(..3).is_some_and(|p| p.eq_ignore_ascii_case("dc=")))
        .collect();

    (!parts.is_empty()).then(|| parts.join(","))
}

fn shortest_subtree_dn<S>(directory: &mut S) -> Option<String>
where
    S: DirectorySearch + ?Sized,
{
    directory
        .search("", SearchScope::Subtree, DEFAULT_FILTER, &["dn"])
        .into_iter()
        .map(|e| e.dn)
        .filter(|dn| !dn.is_empty())
        .reduce(|shortest, dn| if dn.len() < shortest.len() { dn } else { shortest })
}

fn exists<S>(directory: &mut S, dn: &str) -> bool
where
    S: DirectorySearch + ?Sized,
{
    !directory
        .search(dn, SearchScope::Base, DEFAULT_FILTER, &["1.1"])
        .is_empty()
}

/// Determines the base DN with an ordered fallback chain.
#[derive(Debug, Clone)]
pub struct BaseDnResolver {
    strategies: Vec<DiscoveryStrategy>,
    span: Span,
}

impl Default for BaseDnResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl BaseDnResolver {
    /// Resolver using [`DiscoveryStrategy::ALL`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_strategies(DiscoveryStrategy::ALL)
    }

    /// Resolver trying the given strategies in order.
    #[must_use]
    pub fn with_strategies(strategies: impl IntoIterator<Item = DiscoveryStrategy>) -> Self {
        Self {
            strategies: strategies.into_iter().collect(),
            span: tracing::info_span!("base_dn_discovery"),
        }
    }

    /// Sets the span diagnostics are recorded under.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Strategies in the order they are tried.
    #[must_use]
    pub fn strategies(&self) -> &[DiscoveryStrategy] {
        &self.strategies
    }

    /// Returns the first base DN any strategy finds.
    ///
    /// ## Errors
    ///
    /// [`LdapError::BaseDnNotFound`] naming every strategy tried.
    pub fn resolve<S>(&self, directory: &mut S, config: &LdapConfig) -> LdapResult<String>
    where
        S: DirectorySearch + ?Sized,
    {
        let _entered = self.span.enter();

        for strategy in &self.strategies {
            debug!(strategy = strategy.name(), "Trying base DN strategy");
            if let Some(dn) = strategy.attempt(directory, config) {
                info!(base_dn = %dn, strategy = strategy.name(), "Base DN determined");
                return Ok(dn);
            }
        }

        Err(LdapError::BaseDnNotFound {
            attempted: self.strategies.iter().map(|s| s.name()).collect(),
        })
    }
}
