//! Package references - WHICH recipe (name + version), optionally scoped
//! to a user/channel namespace.
//!
//! Declared requirements arrive as strings like `zlib/1.2.13@foundry/stable`.
//! They are parsed exactly once, at the boundary, into the structured types
//! below; nothing downstream splits strings.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// `name/version` with an optional `@user/channel` suffix.
static REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([^/@\s]+)/([^/@\s]+)(?:@([^/@\s]+)/([^/@\s]+))?$")
        .expect("package reference pattern is valid")
});

/// Error produced when a package reference or seed spec cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefError {
    #[error("package {field} must not be empty")]
    Empty { field: &'static str },

    #[error("package {field} `{value}` must not contain '/', '@' or whitespace")]
    InvalidChar { field: &'static str, value: String },

    #[error("malformed package reference `{0}` (expected name/version[@user/channel])")]
    Malformed(String),

    #[error("package reference `{0}` is missing its @user/channel qualifier")]
    Unqualified(String),
}

fn validate(field: &'static str, value: &str) -> Result<(), RefError> {
    if value.is_empty() {
        return Err(RefError::Empty { field });
    }
    if value
        .chars()
        .any(|c| c == '/' || c == '@' || c.is_whitespace())
    {
        return Err(RefError::InvalidChar {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// A package name and exact version.
///
/// Two refs are equal iff both name and version match exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PackageRef {
    name: String,
    version: String,
}

impl PackageRef {
    /// Create a new package reference, validating both components.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Result<Self, RefError> {
        let name = name.into();
        let version = version.into();
        validate("name", &name)?;
        validate("version", &version)?;
        Ok(PackageRef { name, version })
    }

    /// Get the package name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the package version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Scope this reference to a namespace.
    pub fn qualify(&self, namespace: &Namespace) -> QualifiedPackageRef {
        QualifiedPackageRef {
            package: self.clone(),
            namespace: namespace.clone(),
        }
    }
}

impl fmt::Display for PackageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.version)
    }
}

impl FromStr for PackageRef {
    type Err = RefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<Requirement>()? {
            Requirement {
                package,
                namespace: None,
            } => Ok(package),
            Requirement { .. } => Err(RefError::Malformed(s.to_string())),
        }
    }
}

/// The user/channel build namespace packages are built into.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Namespace {
    user: String,
    channel: String,
}

impl Namespace {
    /// Create a namespace, validating both components.
    pub fn new(user: impl Into<String>, channel: impl Into<String>) -> Result<Self, RefError> {
        let user = user.into();
        let channel = channel.into();
        validate("user", &user)?;
        validate("channel", &channel)?;
        Ok(Namespace { user, channel })
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.user, self.channel)
    }
}

/// A package reference scoped to a user/channel namespace.
///
/// Always derived from a [`PackageRef`] plus the ambient [`Namespace`];
/// it addresses one build namespace in the external package store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QualifiedPackageRef {
    package: PackageRef,
    namespace: Namespace,
}

impl QualifiedPackageRef {
    pub fn package(&self) -> &PackageRef {
        &self.package
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        self.package.name()
    }

    pub fn version(&self) -> &str {
        self.package.version()
    }

    pub fn user(&self) -> &str {
        self.namespace.user()
    }

    pub fn channel(&self) -> &str {
        self.namespace.channel()
    }
}

impl fmt::Display for QualifiedPackageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.package, self.namespace)
    }
}

impl FromStr for QualifiedPackageRef {
    type Err = RefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let req: Requirement = s.parse()?;
        match req.namespace {
            Some(namespace) => Ok(QualifiedPackageRef {
                package: req.package,
                namespace,
            }),
            None => Err(RefError::Unqualified(s.to_string())),
        }
    }
}

/// A requirement as declared by a recipe: a package, qualified or not.
///
/// Unqualified requirements can never match the current namespace, so they
/// always refer to externally supplied packages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub package: PackageRef,
    pub namespace: Option<Namespace>,
}

impl Requirement {
    /// Whether a declared requirement string claims `namespace`, judged by
    /// its trailing `@user/channel` alone.
    ///
    /// Requirements aimed elsewhere may use reference forms this crate does
    /// not model (version ranges, a bare trailing `@`), so they are never
    /// parsed.
    pub fn claims(raw: &str, namespace: &Namespace) -> bool {
        match raw.trim().rsplit_once('@') {
            Some((_, suffix)) => {
                suffix.split_once('/') == Some((namespace.user(), namespace.channel()))
            }
            None => false,
        }
    }
}

impl FromStr for Requirement {
    type Err = RefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let caps = REFERENCE
            .captures(s)
            .ok_or_else(|| RefError::Malformed(s.to_string()))?;

        let package = PackageRef::new(&caps[1], &caps[2])?;
        let namespace = match (caps.get(3), caps.get(4)) {
            (Some(user), Some(channel)) => Some(Namespace::new(user.as_str(), channel.as_str())?),
            _ => None,
        };

        Ok(Requirement { package, namespace })
    }
}

/// A seed package as requested by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageSpec {
    /// `all`: the latest version of every available package
    All,
    /// `NAME`: the latest available version of one package
    Latest(String),
    /// `NAME==VERSION` or `NAME/VERSION`
    Exact(PackageRef),
}

impl FromStr for PackageSpec {
    type Err = RefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(PackageSpec::All);
        }

        if let Some((name, version)) = s.split_once("==") {
            return Ok(PackageSpec::Exact(PackageRef::new(name, version)?));
        }

        if s.contains('/') {
            return Ok(PackageSpec::Exact(s.parse()?));
        }

        validate("name", s)?;
        Ok(PackageSpec::Latest(s.to_string()))
    }
}

impl fmt::Display for PackageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageSpec::All => write!(f, "all"),
            PackageSpec::Latest(name) => write!(f, "{}", name),
            PackageSpec::Exact(pkg) => write!(f, "{}=={}", pkg.name(), pkg.version()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_ref_display() {
        let pkg = PackageRef::new("libfoo", "1.2.3").unwrap();
        assert_eq!(pkg.to_string(), "libfoo/1.2.3");
        assert_eq!(pkg.name(), "libfoo");
        assert_eq!(pkg.version(), "1.2.3");
    }

    #[test]
    fn test_package_ref_rejects_delimiters() {
        assert!(matches!(
            PackageRef::new("lib/foo", "1.0"),
            Err(RefError::InvalidChar { field: "name", .. })
        ));
        assert!(matches!(
            PackageRef::new("libfoo", "1.0@x"),
            Err(RefError::InvalidChar { field: "version", .. })
        ));
        assert!(matches!(
            PackageRef::new("", "1.0"),
            Err(RefError::Empty { field: "name" })
        ));
    }

    #[test]
    fn test_qualify() {
        let ns = Namespace::new("foundry", "4.27").unwrap();
        let pkg = PackageRef::new("libfoo", "1.0").unwrap();
        let qualified = pkg.qualify(&ns);

        assert_eq!(qualified.to_string(), "libfoo/1.0@foundry/4.27");
        assert_eq!(qualified.package(), &pkg);
        assert_eq!(qualified.user(), "foundry");
        assert_eq!(qualified.channel(), "4.27");
    }

    #[test]
    fn test_parse_qualified() {
        let qualified: QualifiedPackageRef = "zlib/1.2.13@foundry/stable".parse().unwrap();
        assert_eq!(qualified.name(), "zlib");
        assert_eq!(qualified.version(), "1.2.13");
        assert_eq!(qualified.namespace(), &Namespace::new("foundry", "stable").unwrap());

        assert!(matches!(
            "zlib/1.2.13".parse::<QualifiedPackageRef>(),
            Err(RefError::Unqualified(_))
        ));
    }

    #[test]
    fn test_claims_namespace_by_suffix() {
        let ns = Namespace::new("foundry", "stable").unwrap();
        assert!(Requirement::claims(" libbar/2.0@foundry/stable ", &ns));
        assert!(Requirement::claims("bad ref@foundry/stable", &ns));
        assert!(!Requirement::claims("libbar/2.0@other/stable", &ns));
        assert!(!Requirement::claims("openssl/1.1.1@", &ns));
        assert!(!Requirement::claims("zlib/[>=1.2 <2]@conan/stable", &ns));
        assert!(!Requirement::claims("zlib/1.2", &ns));
    }

    #[test]
    fn test_parse_requirement() {
        let req: Requirement = " libbar/2.0@foundry/stable ".parse().unwrap();
        assert_eq!(req.package, PackageRef::new("libbar", "2.0").unwrap());
        assert_eq!(req.namespace, Some(Namespace::new("foundry", "stable").unwrap()));

        let external: Requirement = "openssl/3.0.0".parse().unwrap();
        assert!(external.namespace.is_none());

        assert!(matches!(
            "not-a-reference".parse::<Requirement>(),
            Err(RefError::Malformed(_))
        ));
        assert!(matches!(
            "a/b/c@d/e".parse::<Requirement>(),
            Err(RefError::Malformed(_))
        ));
    }

    #[test]
    fn test_package_ref_from_str_rejects_qualified() {
        assert!("libfoo/1.0@u/c".parse::<PackageRef>().is_err());
        assert_eq!(
            "libfoo/1.0".parse::<PackageRef>().unwrap(),
            PackageRef::new("libfoo", "1.0").unwrap()
        );
    }

    #[test]
    fn test_package_spec_forms() {
        assert_eq!("all".parse::<PackageSpec>().unwrap(), PackageSpec::All);
        assert_eq!("ALL".parse::<PackageSpec>().unwrap(), PackageSpec::All);
        assert_eq!(
            "libfoo".parse::<PackageSpec>().unwrap(),
            PackageSpec::Latest("libfoo".to_string())
        );
        assert_eq!(
            "libfoo==1.0".parse::<PackageSpec>().unwrap(),
            PackageSpec::Exact(PackageRef::new("libfoo", "1.0").unwrap())
        );
        assert_eq!(
            "libfoo/1.0".parse::<PackageSpec>().unwrap(),
            PackageSpec::Exact(PackageRef::new("libfoo", "1.0").unwrap())
        );
        assert!("libfoo==".parse::<PackageSpec>().is_err());
        assert!("lib@foo".parse::<PackageSpec>().is_err());
    }
}
