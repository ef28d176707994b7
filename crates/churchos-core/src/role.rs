//! The role hierarchy, a total order over four roles.
//!
//! Every authorization decision in the system reduces to a comparison of
//! ranks. Nothing here performs I/O.

use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

// ─── Role ────────────────────────────────────────────────────────────────────

/// A principal's standing in the hierarchy.
///
/// Variants are declared in rank order, so the derived `Ord` agrees with
/// [`Role::rank`]. Deserialization goes through [`FromStr`], so it accepts
/// the same spellings as parsing.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Default,
  Serialize,
  Deserialize,
)]
#[serde(try_from = "String")]
pub enum Role {
  #[default]
  Deacon,
  Elder,
  Apostle,
  #[serde(rename = "Nation Seer")]
  NationSeer,
}

impl Role {
  /// All roles, lowest rank first.
  pub const ALL: [Role; 4] =
    [Role::Deacon, Role::Elder, Role::Apostle, Role::NationSeer];

  /// The role assigned to newly provisioned principals.
  pub const LOWEST: Role = Role::Deacon;

  pub fn rank(self) -> u8 {
    match self {
      Self::Deacon => 1,
      Self::Elder => 2,
      Self::Apostle => 3,
      Self::NationSeer => 4,
    }
  }

  pub fn from_rank(rank: u8) -> Result<Self, Error> {
    Self::ALL
      .into_iter()
      .find(|r| r.rank() == rank)
      .ok_or(Error::UnknownRank(rank))
  }

  /// The name used on the wire and in the database.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Deacon => "Deacon",
      Self::Elder => "Elder",
      Self::Apostle => "Apostle",
      Self::NationSeer => "Nation Seer",
    }
  }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Role {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "deacon" => Ok(Self::Deacon),
      "elder" => Ok(Self::Elder),
      "apostle" => Ok(Self::Apostle),
      "nation seer" | "nation_seer" | "nationseer" => Ok(Self::NationSeer),
      _ => Err(Error::UnknownRole(s.to_owned())),
    }
  }
}

impl TryFrom<String> for Role {
  type Error = Error;

  fn try_from(s: String) -> Result<Self, Self::Error> { s.parse() }
}

// ─── Admission checks ────────────────────────────────────────────────────────

/// `true` if `principal_role` ranks at or above `minimum_role`.
pub fn satisfies_minimum(principal_role: Role, minimum_role: Role) -> bool {
  principal_role.rank() >= minimum_role.rank()
}

/// Admission for "role required" routes.
///
/// Same "at least" comparison as [`satisfies_minimum`]; there is no
/// exact-match-only rule.
pub fn satisfies_exact_or_higher(
  principal_role: Role,
  required_role: Role,
) -> bool {
  satisfies_minimum(principal_role, required_role)
}

/// A principal may only grant roles strictly below their own rank.
pub fn can_assign(assigner_role: Role, target_role: Role) -> bool {
  assigner_role.rank() > target_role.rank()
}

// ─── Permissions ─────────────────────────────────────────────────────────────

// Editorial lists. Each role repeats everything granted to the roles below it.

const DEACON_PERMISSIONS: &[&str] = &[
  "view_prophecies",
  "create_basic_prophecies",
  "join_prayer_sessions",
];

const ELDER_PERMISSIONS: &[&str] = &[
  "view_prophecies",
  "create_basic_prophecies",
  "join_prayer_sessions",
  "create_prophecies",
  "manage_prayer_sessions",
  "access_bible_characters",
  "view_holy_land",
];

const APOSTLE_PERMISSIONS: &[&str] = &[
  "view_prophecies",
  "create_basic_prophecies",
  "join_prayer_sessions",
  "create_prophecies",
  "manage_prayer_sessions",
  "access_bible_characters",
  "view_holy_land",
  "create_scroll_compositions",
  "manage_users",
  "start_livestreams",
];

const NATION_SEER_PERMISSIONS: &[&str] = &[
  "view_prophecies",
  "create_basic_prophecies",
  "join_prayer_sessions",
  "create_prophecies",
  "manage_prayer_sessions",
  "access_bible_characters",
  "view_holy_land",
  "create_scroll_compositions",
  "manage_users",
  "start_livestreams",
  "manage_roles",
  "access_all_modules",
  "prophetic_oversight",
];

fn permission_table(role: Role) -> &'static [&'static str] {
  match role {
    Role::Deacon => DEACON_PERMISSIONS,
    Role::Elder => ELDER_PERMISSIONS,
    Role::Apostle => APOSTLE_PERMISSIONS,
    Role::NationSeer => NATION_SEER_PERMISSIONS,
  }
}

/// The permission strings granted to `role`.
pub fn permissions_for(role: Role) -> BTreeSet<&'static str> {
  permission_table(role).iter().copied().collect()
}
