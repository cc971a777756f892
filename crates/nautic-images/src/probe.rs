//! Runtime image resolution by bounded linear probing.
//!
//! Reconciliation rewrites most records to the exact stored file. Records it
//! missed still carry the remote URL, while the downloader saved the file as
//! `<n>-<basename>` with an `n` the record never learned. The probe walks
//! `<prefix><basename>`, `<prefix>1-<basename>`, ... `<prefix><max>-<basename>`
//! and stops at the first candidate that loads.

use std::future::Future;
use std::path::{Component, Path, PathBuf};

use nautic_core::{AppConfig, RemoteImagePolicy};

use crate::filename::extract_filename;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeSettings {
    pub asset_prefix: String,
    /// Highest download index probed. Attempt 0 is the unprefixed name, so a
    /// full sequence issues `max_probes + 1` attempts.
    pub max_probes: u32,
    pub remote_policy: RemoteImagePolicy,
}

impl ProbeSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            asset_prefix: config.asset_url_prefix.clone(),
            max_probes: config.image_max_probes,
            remote_policy: config.remote_image_policy,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeState {
    /// Waiting for the load outcome of `attempt`.
    Pending { attempt: u32 },
    Loaded { url: String },
    /// Every candidate failed, or the reference yields no filename.
    Unavailable,
    /// The owner went away before the probe finished.
    Disposed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Candidates {
    /// The reference is loaded as-is; no probing.
    Direct(String),
    Indexed {
        prefix: String,
        basename: String,
        max_probes: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Loaded { url: String, attempts: u32 },
    Unavailable { attempts: u32 },
}

/// Probe state for one displayed image. Each displayed image owns its own
/// probe; nothing is shared between them.
#[derive(Debug, Clone)]
pub struct ImageProbe {
    candidates: Option<Candidates>,
    state: ProbeState,
    issued: u32,
}

impl ImageProbe {
    /// Starts a probe for a product's stored image reference.
    ///
    /// Local references, and absolute `http(s)://` URLs under
    /// [`RemoteImagePolicy::Passthrough`], get exactly one candidate: the
    /// reference itself. Everything else probes by basename; a reference
    /// with no extractable basename starts out [`ProbeState::Unavailable`].
    #[must_use]
    pub fn new(image_ref: &str, settings: &ProbeSettings) -> Self {
        let is_local = image_ref.starts_with(&settings.asset_prefix);
        let passthrough = settings.remote_policy == RemoteImagePolicy::Passthrough
            && is_absolute_url(image_ref);

        let candidates = if is_local || passthrough {
            Some(Candidates::Direct(image_ref.to_string()))
        } else {
            let basename = extract_filename(image_ref, &settings.asset_prefix);
            (!basename.is_empty()).then(|| Candidates::Indexed {
                prefix: settings.asset_prefix.clone(),
                basename,
                max_probes: settings.max_probes,
            })
        };

        match candidates {
            Some(candidates) => Self {
                candidates: Some(candidates),
                state: ProbeState::Pending { attempt: 0 },
                issued: 1,
            },
            None => Self {
                candidates: None,
                state: ProbeState::Unavailable,
                issued: 0,
            },
        }
    }

    #[must_use]
    pub fn state(&self) -> &ProbeState {
        &self.state
    }

    /// Number of candidates handed out so far, including the current one.
    #[must_use]
    pub fn attempts_issued(&self) -> u32 {
        self.issued
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self.state, ProbeState::Pending { .. })
    }

    /// The candidate URL currently being loaded, or `None` once terminal.
    #[must_use]
    pub fn current(&self) -> Option<String> {
        match self.state {
            ProbeState::Pending { attempt } => self.candidate(attempt),
            _ => None,
        }
    }

    /// `true` while the current candidate is an absolute URL on another
    /// host, which the asset directory cannot answer for.
    #[must_use]
    pub fn targets_remote(&self) -> bool {
        self.current().is_some_and(|c| is_absolute_url(&c))
    }

    fn candidate(&self, attempt: u32) -> Option<String> {
        match self.candidates.as_ref()? {
            Candidates::Direct(url) => (attempt == 0).then(|| url.clone()),
            Candidates::Indexed {
                prefix,
                basename,
                max_probes,
            } => match attempt {
                0 => Some(format!("{prefix}{basename}")),
                n if n <= *max_probes => Some(format!("{prefix}{n}-{basename}")),
                _ => None,
            },
        }
    }

    /// Records that the current candidate loaded. Terminal.
    pub fn on_load(&mut self) {
        if let Some(url) = self.current() {
            self.state = ProbeState::Loaded { url };
        }
    }

    /// Records that the current candidate failed and returns the next one,
    /// or `None` when the sequence is exhausted (the probe becomes
    /// [`ProbeState::Unavailable`]) or already terminal.
    pub fn on_error(&mut self) -> Option<String> {
        let ProbeState::Pending { attempt } = self.state else {
            return None;
        };
        let next_attempt = attempt.saturating_add(1);
        match self.candidate(next_attempt) {
            Some(url) if next_attempt > attempt => {
                self.state = ProbeState::Pending {
                    attempt: next_attempt,
                };
                self.issued += 1;
                Some(url)
            }
            _ => {
                self.state = ProbeState::Unavailable;
                None
            }
        }
    }

    /// Stops probing because the owner is gone. No further candidates are
    /// produced; a finished probe keeps its outcome.
    pub fn dispose(&mut self) {
        if !self.is_terminal() {
            self.state = ProbeState::Disposed;
        }
    }

    /// Drives the probe to completion with a synchronous loader that reports
    /// whether a candidate URL loads.
    pub fn resolve_with<F>(mut self, mut load: F) -> ProbeOutcome
    where
        F: FnMut(&str) -> bool,
    {
        let mut next = self.current();
        while let Some(candidate) = next {
            if load(&candidate) {
                self.on_load();
                return ProbeOutcome::Loaded {
                    url: candidate,
                    attempts: self.issued,
                };
            }
            next = self.on_error();
        }
        ProbeOutcome::Unavailable {
            attempts: self.issued,
        }
    }

    /// Async counterpart of [`Self::resolve_with`]; one load in flight at a time.
    pub async fn resolve_with_async<F, Fut>(mut self, mut load: F) -> ProbeOutcome
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = bool>,
    {
        let mut next = self.current();
        while let Some(candidate) = next {
            if load(candidate.clone()).await {
                self.on_load();
                return ProbeOutcome::Loaded {
                    url: candidate,
                    attempts: self.issued,
                };
            }
            next = self.on_error();
        }
        ProbeOutcome::Unavailable {
            attempts: self.issued,
        }
    }
}

fn is_absolute_url(image_ref: &str) -> bool {
    let lower = image_ref.get(..8).unwrap_or(image_ref).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Loads candidates from the asset directory on disk, the way the static
/// server would.
#[derive(Debug, Clone)]
pub struct DirectoryLoader {
    asset_dir: PathBuf,
    asset_prefix: String,
}

impl DirectoryLoader {
    #[must_use]
    pub fn new(asset_dir: impl Into<PathBuf>, asset_prefix: impl Into<String>) -> Self {
        Self {
            asset_dir: asset_dir.into(),
            asset_prefix: asset_prefix.into(),
        }
    }

    /// Returns `true` if `candidate` names a regular file directly inside the
    /// asset directory. Candidates outside the prefix never load.
    #[must_use]
    pub fn exists(&self, candidate: &str) -> bool {
        let Some(name) = candidate.strip_prefix(&self.asset_prefix) else {
            return false;
        };
        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => self.asset_dir.join(name).is_file(),
            _ => false,
        }
    }
}

/// Loads candidates over HTTP with `HEAD` requests. Relative candidates are
/// joined onto `base_url`.
#[derive(Debug, Clone)]
pub struct HttpLoader {
    client: reqwest::Client,
    base_url: String,
}

impl HttpLoader {
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn exists(&self, candidate: &str) -> bool {
        let url = if is_absolute_url(candidate) {
            candidate.to_string()
        } else {
            format!("{}{candidate}", self.base_url)
        };
        match self.client.head(&url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "image probe request failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX: &str = "/ricambi-images/";
    const CDN_WIDGET: &str = "https://cdn.shopify.com/s/files/1/0689/1087/4891/files/widget.jpg?v=3";

    fn settings(max_probes: u32, remote_policy: RemoteImagePolicy) -> ProbeSettings {
        ProbeSettings {
            asset_prefix: PREFIX.to_string(),
            max_probes,
            remote_policy,
        }
    }

    #[test]
    fn local_reference_has_exactly_one_candidate() {
        let mut probe = ImageProbe::new("/ricambi-images/4-widget.jpg", &settings(300, RemoteImagePolicy::Probe));
        assert_eq!(probe.current().as_deref(), Some("/ricambi-images/4-widget.jpg"));
        assert_eq!(probe.on_error(), None);
        assert_eq!(probe.state(), &ProbeState::Unavailable);
        assert_eq!(probe.attempts_issued(), 1);
    }

    #[test]
    fn remote_reference_passes_through_by_default() {
        let probe = ImageProbe::new(CDN_WIDGET, &settings(300, RemoteImagePolicy::Passthrough));
        assert_eq!(probe.current().as_deref(), Some(CDN_WIDGET));
        assert!(probe.targets_remote());
    }

    #[test]
    fn only_absolute_candidates_target_remote() {
        let probed = ImageProbe::new(CDN_WIDGET, &settings(300, RemoteImagePolicy::Probe));
        assert!(!probed.targets_remote());

        let local = ImageProbe::new("/ricambi-images/a.jpg", &settings(300, RemoteImagePolicy::Passthrough));
        assert!(!local.targets_remote());

        let mut passthrough = ImageProbe::new(CDN_WIDGET, &settings(300, RemoteImagePolicy::Passthrough));
        assert_eq!(passthrough.on_error(), None);
        assert!(!passthrough.targets_remote());
    }

    #[test]
    fn remote_reference_is_probed_under_probe_policy() {
        let probe = ImageProbe::new(CDN_WIDGET, &settings(300, RemoteImagePolicy::Probe));
        assert_eq!(probe.current().as_deref(), Some("/ricambi-images/widget.jpg"));
    }

    #[test]
    fn protocol_relative_reference_is_always_probed() {
        let probe = ImageProbe::new(
            "//cdn.shopify.com/s/files/1/0689/1087/4891/files/widget.jpg",
            &settings(300, RemoteImagePolicy::Passthrough),
        );
        assert_eq!(probe.current().as_deref(), Some("/ricambi-images/widget.jpg"));
    }

    #[test]
    fn reference_without_filename_is_unavailable_immediately() {
        let probe = ImageProbe::new("widget.jpg", &settings(300, RemoteImagePolicy::Probe));
        assert_eq!(probe.state(), &ProbeState::Unavailable);
        assert_eq!(probe.current(), None);
        assert_eq!(probe.attempts_issued(), 0);
    }

    #[test]
    fn finds_indexed_file_after_exactly_four_failures() {
        let probe = ImageProbe::new(CDN_WIDGET, &settings(300, RemoteImagePolicy::Probe));
        let mut seen = Vec::new();
        let outcome = probe.resolve_with(|candidate| {
            seen.push(candidate.to_string());
            candidate == "/ricambi-images/4-widget.jpg"
        });
        assert_eq!(
            outcome,
            ProbeOutcome::Loaded {
                url: "/ricambi-images/4-widget.jpg".to_string(),
                attempts: 5,
            }
        );
        assert_eq!(
            seen,
            vec![
                "/ricambi-images/widget.jpg",
                "/ricambi-images/1-widget.jpg",
                "/ricambi-images/2-widget.jpg",
                "/ricambi-images/3-widget.jpg",
                "/ricambi-images/4-widget.jpg",
            ]
        );
        assert!(!seen.iter().any(|c| c.contains("5-widget")));
    }

    #[test]
    fn exhausting_max_probes_ends_unavailable() {
        let mut probe = ImageProbe::new(CDN_WIDGET, &settings(3, RemoteImagePolicy::Probe));
        let mut calls = 0;
        while probe.current().is_some() {
            calls += 1;
            probe.on_error();
        }
        assert_eq!(calls, 4);
        assert_eq!(probe.state(), &ProbeState::Unavailable);
        assert_eq!(probe.on_error(), None);
        assert_eq!(probe.current(), None);
        assert_eq!(probe.attempts_issued(), 4);
    }

    #[test]
    fn success_is_terminal() {
        let mut probe = ImageProbe::new(CDN_WIDGET, &settings(10, RemoteImagePolicy::Probe));
        probe.on_error();
        probe.on_load();
        assert_eq!(
            probe.state(),
            &ProbeState::Loaded {
                url: "/ricambi-images/1-widget.jpg".to_string()
            }
        );
        assert_eq!(probe.on_error(), None);
        probe.dispose();
        assert!(matches!(probe.state(), ProbeState::Loaded { .. }));
    }

    #[test]
    fn disposal_stops_probing() {
        let mut probe = ImageProbe::new(CDN_WIDGET, &settings(10, RemoteImagePolicy::Probe));
        probe.on_error();
        probe.dispose();
        assert_eq!(probe.state(), &ProbeState::Disposed);
        assert_eq!(probe.current(), None);
        assert_eq!(probe.on_error(), None);
        assert_eq!(probe.attempts_issued(), 2);
    }

    #[test]
    fn zero_max_probes_tries_only_the_unprefixed_name() {
        let outcome = ImageProbe::new(CDN_WIDGET, &settings(0, RemoteImagePolicy::Probe))
            .resolve_with(|_| false);
        assert_eq!(outcome, ProbeOutcome::Unavailable { attempts: 1 });
    }

    #[test]
    fn directory_loader_checks_files_inside_asset_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("4-widget.jpg"), b"img").unwrap();
        let loader = DirectoryLoader::new(dir.path(), PREFIX);

        assert!(loader.exists("/ricambi-images/4-widget.jpg"));
        assert!(!loader.exists("/ricambi-images/widget.jpg"));
        assert!(!loader.exists("/ricambi-images/../4-widget.jpg"));
        assert!(!loader.exists("/moto/4-widget.jpg"));

        let outcome = ImageProbe::new(CDN_WIDGET, &settings(300, RemoteImagePolicy::Probe))
            .resolve_with(|c| loader.exists(c));
        assert_eq!(
            outcome,
            ProbeOutcome::Loaded {
                url: "/ricambi-images/4-widget.jpg".to_string(),
                attempts: 5,
            }
        );
    }
}
