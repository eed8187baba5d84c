//! Channel privileges and the roles that grant them.

use crate::error::PackError;
use crate::packer::{Packer, Unpacker};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A permission inside an RTC channel. The discriminant is the wire code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum Privilege {
    JoinChannel = 1,
    PublishAudioStream = 2,
    PublishVideoStream = 3,
    PublishDataStream = 4,
}

impl Privilege {
    pub const ALL: [Privilege; 4] = [
        Privilege::JoinChannel,
        Privilege::PublishAudioStream,
        Privilege::PublishVideoStream,
        Privilege::PublishDataStream,
    ];

    pub fn code(self) -> u16 {
        self as u16
    }

    pub fn from_code(code: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.code() == code)
    }
}

/// Role of the user inside the channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    /// May join and publish audio, video and data streams
    #[default]
    Publisher,
    /// May only join
    Subscriber,
}

impl Role {
    /// Privileges this role is granted
    pub fn privileges(self) -> &'static [Privilege] {
        match self {
            Role::Publisher => &Privilege::ALL,
            Role::Subscriber => &[Privilege::JoinChannel],
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Publisher => write!(f, "publisher"),
            Role::Subscriber => write!(f, "subscriber"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "publisher" => Ok(Role::Publisher),
            "subscriber" => Ok(Role::Subscriber),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// Privileges mapped to their expiry, in seconds since the unix epoch.
///
/// Entries are kept ordered by privilege code, which is also the order they
/// are serialized in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrivilegeSet(BTreeMap<Privilege, u32>);

impl PrivilegeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grants every privilege of `role` with the same expiry
    pub fn for_role(role: Role, expire_ts: u32) -> Self {
        role.privileges()
            .iter()
            .fold(Self::new(), |set, p| set.with(*p, expire_ts))
    }

    /// Grants (or overrides) a single privilege
    pub fn with(mut self, privilege: Privilege, expire_ts: u32) -> Self {
        self.grant(privilege, expire_ts);
        self
    }

    pub fn grant(&mut self, privilege: Privilege, expire_ts: u32) {
        self.0.insert(privilege, expire_ts);
    }

    pub fn expiry(&self, privilege: Privilege) -> Option<u32> {
        self.0.get(&privilege).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Privilege, u32)> + '_ {
        self.0.iter().map(|(p, ts)| (*p, *ts))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn pack(&self, packer: &mut Packer) {
        // At most four privileges exist, so the count always fits
        packer.put_u16(self.0.len() as u16);
        for (privilege, expire_ts) in self.iter() {
            packer.put_u16(privilege.code()).put_u32(expire_ts);
        }
    }

    pub(crate) fn unpack(unpacker: &mut Unpacker<'_>) -> Result<Self, PackError> {
        let count = unpacker.get_u16()?;
        let mut set = Self::new();
        for _ in 0..count {
            let code = unpacker.get_u16()?;
            let expire_ts = unpacker.get_u32()?;
            let privilege = Privilege::from_code(code).ok_or(PackError::UnknownPrivilege(code))?;
            set.grant(privilege, expire_ts);
        }
        Ok(set)
    }
}
