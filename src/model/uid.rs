use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::{Arc, OnceLock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use rand::rngs::OsRng;
use rand::TryRngCore;
use serde::Serialize;
use crate::tools::{Error, Result};

/// maximum length of a UI value
pub const UID_MAX_LEN:usize = 64;
// 2^62-1 has 19 decimal digits
const SUFFIX_MAX_DIGITS:usize = 19;
const SUFFIX_MASK:u64 = (1<<62)-1;

/// A validated organization root, the prefix all generated identifiers share.
#[derive(Debug,Clone,PartialEq,Eq)]
pub struct OrgRoot(String);

impl OrgRoot {
	pub fn new<T>(root:T) -> Result<Self> where String:From<T>
	{
		let root = String::from(root);
		let invalid = |reason:&str| Error::InvalidOrgRoot {root:root.clone(),reason:reason.into()};
		if root.is_empty() {
			return Err(invalid("empty"));
		}
		if root.len() + 1 + SUFFIX_MAX_DIGITS > UID_MAX_LEN {
			return Err(invalid("too long to leave room for the generated suffix"));
		}
		for component in root.split('.') {
			if component.is_empty() {
				return Err(invalid("empty component"));
			}
			if !component.bytes().all(|b|b.is_ascii_digit()) {
				return Err(invalid("components must be numeric"));
			}
			if component.len() > 1 && component.starts_with('0') {
				return Err(invalid("components must not have leading zeros"));
			}
		}
		Ok(OrgRoot(root))
	}
	pub fn as_str(&self) -> &str {&self.0}
}

impl FromStr for OrgRoot {
	type Err = Error;
	fn from_str(s: &str) -> Result<Self> {OrgRoot::new(s)}
}

impl Display for OrgRoot {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {f.write_str(&self.0)}
}

/// A generated unique identifier (`<org_root>.<suffix>`).
#[derive(Debug,Clone,PartialEq,Eq,Hash,PartialOrd,Ord,Serialize)]
#[serde(transparent)]
pub struct Uid(String);

impl Uid {
	pub fn as_str(&self) -> &str {&self.0}
}

impl AsRef<str> for Uid {
	fn as_ref(&self) -> &str {&self.0}
}

impl Display for Uid {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {f.write_str(&self.0)}
}

/// Source of the random identifier suffix.
pub trait EntropySource: Send + Sync {
	fn next_u64(&self) -> std::result::Result<u64,String>;
}

/// The operating system's cryptographically secure generator.
pub struct OsEntropy;

impl EntropySource for OsEntropy {
	fn next_u64(&self) -> std::result::Result<u64, String> {
		OsRng.try_next_u64().map_err(|e|e.to_string())
	}
}

/// Produces identifiers under one organization root.
///
/// Clones share the entropy source and the degraded state, so a fallback in
/// any worker is visible to every other handle.
#[derive(Clone)]
pub struct UidGenerator {
	root:OrgRoot,
	entropy:Arc<dyn EntropySource>,
	fallback:Arc<Fallback>,
}

/// state of the timestamp fallback, shared by all clones
#[derive(Default)]
struct Fallback {
	/// reason of the first failure
	reason:OnceLock<String>,
	/// keeps suffixes from the same clock tick apart
	counter:AtomicU64,
}

impl UidGenerator {
	pub fn new(root:OrgRoot) -> Self
	{
		Self::with_entropy(root,OsEntropy)
	}
	pub fn with_entropy<E>(root:OrgRoot,entropy:E) -> Self where E:EntropySource + 'static
	{
		UidGenerator{root,entropy:Arc::new(entropy),fallback:Default::default()}
	}

	pub fn root(&self) -> &OrgRoot {&self.root}

	pub fn generate_identifier(&self) -> Uid
	{
		let suffix = match self.entropy.next_u64() {
			Ok(n) => n & SUFFIX_MASK,
			Err(reason) => self.fallback_suffix(reason),
		};
		Uid(format!("{}.{suffix}",self.root))
	}

	fn fallback_suffix(&self, reason:String) -> u64
	{
		if self.fallback.reason.set(reason.clone()).is_ok() {
			tracing::warn!("secure randomness failed ({reason}), falling back to timestamp based identifiers");
		} else {
			tracing::debug!("secure randomness still unavailable ({reason})");
		}
		let nanos = SystemTime::now().duration_since(UNIX_EPOCH)
			.map(|d|d.as_nanos() as u64)
			.unwrap_or_default();
		let count = self.fallback.counter.fetch_add(1,Ordering::Relaxed);
		nanos.wrapping_add(count) & SUFFIX_MASK
	}

	/// true if any identifier from this generator (or a clone) came from the fallback
	pub fn is_degraded(&self) -> bool {self.fallback.reason.get().is_some()}

	/// the reason for the first fallback, if any
	pub fn degradation(&self) -> Option<Error>
	{
		self.fallback.reason.get().map(|reason|Error::InsecureRandomFallback {reason:reason.clone()})
	}
}
