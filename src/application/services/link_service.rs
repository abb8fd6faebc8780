//! Link admission, retrieval and removal service.

use std::sync::Arc;

use crate::application::admission::{AdmissionError, AdmissionOptions};
use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::{LinkRepository, StoreError, UniqueField};
use crate::error::AppError;
use crate::infrastructure::network::{
    AddressResolver, ProbeRequest, ReachabilityProbe, Reachable, ResolvedAddressSet, resolve,
};
use crate::utils::code_generator::{generate_unique_code, validate_custom_code};
use crate::utils::url_validator::{CandidateUrl, validate};
use serde_json::json;

/// Service admitting target URLs and managing the resulting links.
///
/// Admission runs strictly in sequence and stops at the first failure:
///
/// 1. URL validation
/// 2. DNS resolution with the private-range filter, then the HTTP probe
///    (both skipped when [`AdmissionOptions::skip_reachability`] is set)
/// 3. Duplicate-target check
/// 4. Explicit code validation and uniqueness, or random code generation
/// 5. Insert
///
/// The duplicate and uniqueness checks are advisory; the store's unique
/// constraints settle concurrent admissions and the losing insert is reported
/// as a conflict.
pub struct LinkService {
    links: Arc<dyn LinkRepository>,
    resolver: Arc<dyn AddressResolver>,
    prober: Arc<dyn ReachabilityProbe>,
    defaults: AdmissionOptions,
}

impl LinkService {
    /// Creates a new link service.
    ///
    /// `defaults` are the options used by [`Self::create_link_with_defaults`].
    pub fn new(
        links: Arc<dyn LinkRepository>,
        resolver: Arc<dyn AddressResolver>,
        prober: Arc<dyn ReachabilityProbe>,
        defaults: AdmissionOptions,
    ) -> Self {
        Self {
            links,
            resolver,
            prober,
            defaults,
        }
    }

    /// Options applied by [`Self::create_link_with_defaults`].
    pub fn default_options(&self) -> &AdmissionOptions {
        &self.defaults
    }

    /// Admits `target` using the service's configured options.
    ///
    /// # Errors
    ///
    /// See [`Self::create_link`].
    pub async fn create_link_with_defaults(
        &self,
        target: &str,
        explicit_code: Option<&str>,
    ) -> Result<Link, AdmissionError> {
        self.create_link(target, explicit_code, &self.defaults).await
    }

    /// Admits `target` and stores it under `explicit_code` or a generated code.
    ///
    /// # Errors
    ///
    /// Every [`AdmissionError`] kind can be returned; each one names the stage
    /// that rejected the target. A target that is already stored yields
    /// [`AdmissionError::DuplicateTarget`] carrying the existing code.
    pub async fn create_link(
        &self,
        target: &str,
        explicit_code: Option<&str>,
        options: &AdmissionOptions,
    ) -> Result<Link, AdmissionError> {
        let result = self.admit(target, explicit_code, options).await;

        match &result {
            Ok(link) => {
                metrics::counter!("tinylink_admissions_total", "outcome" => "admitted")
                    .increment(1);
                tracing::info!(code = %link.code, url = %link.target, "Link admitted");
            }
            Err(e) => {
                let kind = e.kind().as_str();
                metrics::counter!("tinylink_admissions_total", "outcome" => kind).increment(1);
                tracing::warn!(url = %target, kind, reason = %e, "Link rejected");
            }
        }

        result
    }

    async fn admit(
        &self,
        target: &str,
        explicit_code: Option<&str>,
        options: &AdmissionOptions,
    ) -> Result<Link, AdmissionError> {
        options.validate()?;
        let candidate = validate(target)?;

        if options.skip_reachability {
            tracing::warn!(
                url = candidate.as_str(),
                "Reachability check disabled, skipping resolution and probe"
            );
        } else {
            self.check_reachability(&candidate, options).await?;
        }

        if let Some(existing) = self.links.find_by_target(candidate.as_str()).await? {
            return Err(AdmissionError::DuplicateTarget {
                existing_code: existing.code,
                target: existing.target,
            });
        }

        let code = match explicit_code {
            Some(code) => {
                validate_custom_code(code)?;
                if self.links.exists(code).await? {
                    return Err(AdmissionError::CodeConflict {
                        code: code.to_string(),
                    });
                }
                code.to_string()
            }
            None => {
                generate_unique_code(
                    options.code_length,
                    self.links.as_ref(),
                    options.max_code_attempts,
                )
                .await?
            }
        };

        let new_link = NewLink {
            code: code.clone(),
            target: candidate.as_str().to_string(),
        };

        match self.links.insert(new_link).await {
            Ok(link) => Ok(link),
            Err(StoreError::UniqueViolation(UniqueField::Code)) => {
                Err(AdmissionError::CodeConflict { code })
            }
            Err(StoreError::UniqueViolation(UniqueField::Target)) => {
                Err(self.duplicate_after_race(candidate.as_str()).await)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Resolves the candidate host, applies the private-range policy and probes it.
    ///
    /// Nothing is stored. See [`check_reachability`].
    ///
    /// # Errors
    ///
    /// Returns [`AdmissionError::DnsFailed`], [`AdmissionError::NoAddress`],
    /// [`AdmissionError::PrivateAddress`] or [`AdmissionError::HttpUnreachable`].
    pub async fn check_reachability(
        &self,
        candidate: &CandidateUrl,
        options: &AdmissionOptions,
    ) -> Result<ReachabilityReport, AdmissionError> {
        check_reachability(
            self.resolver.as_ref(),
            self.prober.as_ref(),
            candidate,
            options,
        )
        .await
    }

    /// Builds the rejection for an insert that lost a race on the target constraint.
    async fn duplicate_after_race(&self, target: &str) -> AdmissionError {
        match self.links.find_by_target(target).await {
            Ok(Some(existing)) => AdmissionError::DuplicateTarget {
                existing_code: existing.code,
                target: existing.target,
            },
            Ok(None) => AdmissionError::DuplicateTarget {
                existing_code: String::new(),
                target: target.to_string(),
            },
            Err(e) => e.into(),
        }
    }

    /// Retrieves a link by its short code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link matches the code.
    /// Returns [`AppError::Internal`] on store errors.
    pub async fn get_link(&self, code: &str) -> Result<Link, AppError> {
        self.links
            .find_by_code(code)
            .await?
            .ok_or_else(|| AppError::not_found("Short link not found", json!({ "code": code })))
    }

    /// Lists every link, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on store errors.
    pub async fn list_links(&self) -> Result<Vec<Link>, AppError> {
        Ok(self.links.list().await?)
    }

    /// Deletes a link by its short code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link matches the code.
    pub async fn delete_link(&self, code: &str) -> Result<(), AppError> {
        if self.links.delete(code).await? {
            tracing::info!(%code, "Link deleted");
            Ok(())
        } else {
            Err(AppError::not_found(
                "Short link not found",
                json!({ "code": code }),
            ))
        }
    }

    /// Checks that the link store answers.
    pub async fn store_healthy(&self) -> Result<(), StoreError> {
        self.links.ping().await
    }
}

/// Outcome of a successful reachability check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReachabilityReport {
    /// Addresses that passed the private-range filter.
    pub resolved: ResolvedAddressSet,
    /// Method and status of the attempt that succeeded.
    pub reachable: Reachable,
}

/// Resolves the candidate host, applies the private-range policy and probes it.
///
/// With [`AdmissionOptions::pin_probe_address`] the probe connects only to the
/// vetted addresses of the target host and follows a redirect only while it
/// stays on that host. IP-literal hosts are probed directly.
///
/// Used by admission and by the admin CLI's dry-run check.
///
/// # Errors
///
/// Returns [`AdmissionError::DnsFailed`], [`AdmissionError::NoAddress`],
/// [`AdmissionError::PrivateAddress`] or [`AdmissionError::HttpUnreachable`].
pub async fn check_reachability(
    resolver: &dyn AddressResolver,
    prober: &dyn ReachabilityProbe,
    candidate: &CandidateUrl,
    options: &AdmissionOptions,
) -> Result<ReachabilityReport, AdmissionError> {
    let resolved = resolve(resolver, candidate, options.allow_private_address).await?;

    let pinned = if options.pin_probe_address && !resolved.is_literal() {
        resolved.socket_addrs(candidate.port())
    } else {
        Vec::new()
    };

    let request = ProbeRequest {
        url: candidate.url().clone(),
        timeout: options.timeout,
        pinned,
    };

    let reachable = prober
        .probe(request)
        .await
        .map_err(|e| AdmissionError::HttpUnreachable {
            reason: e.to_string(),
        })?;

    tracing::debug!(
        url = candidate.as_str(),
        method = %reachable.method,
        status = reachable.status,
        "Target reachable"
    );

    Ok(ReachabilityReport {
        resolved,
        reachable,
    })
}
