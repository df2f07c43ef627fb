//! # Credential Subjects
//!
//! The typed union carried in `credentialSubject`. The variant determines
//! the credential's type name; the wire form is internally tagged by
//! `kind`.

use serde::{Deserialize, Serialize};

use pcc_core::{AssuranceTier, IdentityHandle, ProjectId, Timestamp};

/// The kinds of credential the engine issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CredentialKind {
    ProfessionalEngineerLicense,
    NationalIdentityBinding,
    DelegatedAuthority,
    AuditorAccreditation,
}

impl CredentialKind {
    /// The credential type name placed after `VerifiableCredential`.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::ProfessionalEngineerLicense => "ProfessionalEngineerLicenseCredential",
            Self::NationalIdentityBinding => "NationalIdentityBindingCredential",
            Self::DelegatedAuthority => "DelegatedAuthorityCredential",
            Self::AuditorAccreditation => "AuditorAccreditationCredential",
        }
    }
}

impl std::fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A licensed engineer permitted to sign inspection reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfessionalEngineerLicense {
    /// The licensed engineer.
    pub id: IdentityHandle,
    pub license_number: String,
    pub issuing_body: String,
    pub discipline: String,
}

/// Binds an identity handle to a hashed national identifier.
///
/// Only the SHA-256 hex of the national identifier is carried; the raw
/// number never enters a credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NationalIdentityBinding {
    pub id: IdentityHandle,
    pub national_id_hash: String,
    pub assurance_tier: AssuranceTier,
}

/// Authority delegated from one actor to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegatedAuthority {
    /// The delegate.
    pub id: IdentityHandle,
    /// The actor delegating its authority.
    pub delegator: IdentityHandle,
    /// Actions the delegate may perform.
    pub scope: Vec<String>,
    /// Restricts the delegation to a single project when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,
}

/// Accreditation of an independent auditor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditorAccreditation {
    pub id: IdentityHandle,
    pub accreditation_body: String,
    pub accreditation_number: String,
    #[serde(default)]
    pub jurisdictions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accredited_until: Option<Timestamp>,
}

/// The `credentialSubject` of a credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum CredentialSubject {
    ProfessionalEngineerLicense(ProfessionalEngineerLicense),
    NationalIdentityBinding(NationalIdentityBinding),
    DelegatedAuthority(DelegatedAuthority),
    AuditorAccreditation(AuditorAccreditation),
}

impl CredentialSubject {
    /// Which kind of credential this subject belongs to.
    pub fn kind(&self) -> CredentialKind {
        match self {
            Self::ProfessionalEngineerLicense(_) => CredentialKind::ProfessionalEngineerLicense,
            Self::NationalIdentityBinding(_) => CredentialKind::NationalIdentityBinding,
            Self::DelegatedAuthority(_) => CredentialKind::DelegatedAuthority,
            Self::AuditorAccreditation(_) => CredentialKind::AuditorAccreditation,
        }
    }

    /// The actor the credential is about.
    pub fn subject_id(&self) -> &IdentityHandle {
        match self {
            Self::ProfessionalEngineerLicense(s) => &s.id,
            Self::NationalIdentityBinding(s) => &s.id,
            Self::DelegatedAuthority(s) => &s.id,
            Self::AuditorAccreditation(s) => &s.id,
        }
    }
}
