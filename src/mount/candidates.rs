//! Mount attempt generation
//!
//! Builds the ordered (mount point, share) pairs the auto-mounter walks through.

use std::fmt;
use std::path::PathBuf;

use crate::config::NasConfig;

/// How to authenticate against the share
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    User {
        name: String,
        password: Option<String>,
    },
    Guest,
    Anonymous,
}

/// A share address together with the identity used to open it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareCandidate {
    pub host: String,
    pub share: String,
    pub credentials: Credentials,
}

/// Never prints the password
impl fmt::Display for ShareCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.credentials {
            Credentials::User { name, .. } => write!(f, "//{}@{}/{}", name, self.host, self.share),
            Credentials::Guest => write!(f, "//guest@{}/{}", self.host, self.share),
            Credentials::Anonymous => write!(f, "//{}/{}", self.host, self.share),
        }
    }
}

/// One step of the brute-force search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountAttempt {
    pub mount_point: PathBuf,
    pub share: ShareCandidate,
}

/// Configured user first, then alternative users, guest, anonymous
pub fn share_candidates(nas: &NasConfig) -> Vec<ShareCandidate> {
    let mut identities = Vec::new();

    let configured = nas.username.as_deref().filter(|u| !u.trim().is_empty());
    if let Some(user) = configured {
        identities.push(Credentials::User {
            name: user.to_string(),
            password: nas.password.clone().filter(|p| !p.is_empty()),
        });
    }

    for alt in &nas.alternative_users {
        let alt = alt.trim();
        if alt.is_empty() || Some(alt) == configured || alt.eq_ignore_ascii_case("guest") {
            continue;
        }
        let creds = Credentials::User {
            name: alt.to_string(),
            password: None,
        };
        if !identities.contains(&creds) {
            identities.push(creds);
        }
    }

    identities.push(Credentials::Guest);
    identities.push(Credentials::Anonymous);

    identities
        .into_iter()
        .map(|credentials| ShareCandidate {
            host: nas.host.clone(),
            share: nas.share.clone(),
            credentials,
        })
        .collect()
}

/// Every mount point paired with every share candidate, mount point major
pub fn mount_attempts(nas: &NasConfig) -> Vec<MountAttempt> {
    let shares = share_candidates(nas);
    nas.mount_points
        .iter()
        .flat_map(|point| {
            shares.iter().map(move |share| MountAttempt {
                mount_point: point.clone(),
                share: share.clone(),
            })
        })
        .collect()
}
