// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::runtime::{
    fail::Fail,
    network::{
        config::EthernetConfig,
        types::MacAddress,
    },
};
use ::std::{
    fs::File,
    io::Read,
    ops::Index,
    str::FromStr,
};
use ::yaml_rust::{
    Yaml,
    YamlLoader,
};

//======================================================================================================================
// Constants
//======================================================================================================================

// Ethernet layer options.
mod ethernet_config {
    pub const SECTION_NAME: &str = "ethernet";
    // Local network MAC address.
    pub const LOCAL_LINK_ADDR: &str = "local_link_addr";
    pub const ENABLE_ARP: &str = "enable_arp";
    pub const ENABLE_VLAN: &str = "enable_vlan";
    pub const VLAN_TAGS: &str = "vlan_tags";
}

//======================================================================================================================
// Structures
//======================================================================================================================

/// Ethernet layer configuration file.
#[derive(Clone, Debug)]
pub struct Config(pub Yaml);

//======================================================================================================================
// Associated Functions
//======================================================================================================================

impl Config {
    /// Reads a configuration file into a [Config] object.
    pub fn new(config_path: &str) -> Result<Self, Fail> {
        let mut config_s: String = String::new();
        File::open(config_path)?.read_to_string(&mut config_s)?;
        Self::from_str_contents(&config_s)
    }

    /// Parses the contents of a configuration file into a [Config] object.
    pub fn from_str_contents(contents: &str) -> Result<Self, Fail> {
        let config: Vec<Yaml> = match YamlLoader::load_from_str(contents) {
            Ok(config) => config,
            Err(e) => {
                let cause: String = format!("malformed configuration file: {:?}", e);
                error!("from_str_contents(): {}", cause);
                return Err(Fail::new(libc::EINVAL, &cause));
            },
        };
        let config_obj: &Yaml = match &config[..] {
            [c] => c,
            _ => return Err(Fail::new(libc::EINVAL, "Wrong number of config objects")),
        };

        Ok(Self(config_obj.clone()))
    }

    fn get_ethernet_config(&self) -> Result<&Yaml, Fail> {
        Self::get_subsection(&self.0, ethernet_config::SECTION_NAME)
    }

    /// Reads the "local link address" parameter from the environment variable first and then the underlying
    /// configuration file.
    pub fn local_link_addr(&self) -> Result<MacAddress, Fail> {
        if let Some(addr) = Self::get_typed_env_option(ethernet_config::LOCAL_LINK_ADDR)? {
            Ok(addr)
        } else {
            Self::get_typed_str_option(
                self.get_ethernet_config()?,
                ethernet_config::LOCAL_LINK_ADDR,
                |val: &str| match MacAddress::parse_canonical_str(val) {
                    Ok(local_addr) => Some(local_addr),
                    _ => None,
                },
            )
        }
    }

    /// Reads whether link-address resolution through ARP is enabled.
    pub fn enable_arp(&self) -> Result<bool, Fail> {
        if let Some(enable) = Self::get_typed_env_option(ethernet_config::ENABLE_ARP)? {
            Ok(enable)
        } else {
            Self::get_bool_option(self.get_ethernet_config()?, ethernet_config::ENABLE_ARP)
        }
    }

    /// Reads whether VLAN processing is enabled.
    pub fn enable_vlan(&self) -> Result<bool, Fail> {
        if let Some(enable) = Self::get_typed_env_option(ethernet_config::ENABLE_VLAN)? {
            Ok(enable)
        } else {
            Self::get_bool_option(self.get_ethernet_config()?, ethernet_config::ENABLE_VLAN)
        }
    }

    /// Reads the list of VLAN tags to enable on start up. A missing list means no tags. This cannot be passed in as
    /// an environment variable.
    pub fn vlan_tags(&self) -> Result<Vec<u16>, Fail> {
        let section: &Yaml = self.get_ethernet_config()?;
        let tags: &Vec<Yaml> = match section.index(ethernet_config::VLAN_TAGS) {
            Yaml::BadValue => return Ok(Vec::new()),
            Yaml::Array(tags) => tags,
            _ => {
                let cause: String = format!("parameter \"{}\" has unexpected type", ethernet_config::VLAN_TAGS);
                error!("vlan_tags(): {}", cause);
                return Err(Fail::new(libc::EINVAL, &cause));
            },
        };

        let mut result: Vec<u16> = Vec::with_capacity(tags.len());
        for tag in tags {
            match tag.as_i64().map(u16::try_from) {
                Some(Ok(tag)) => result.push(tag),
                _ => {
                    let cause: String = format!("invalid VLAN tag {:?}", tag);
                    error!("vlan_tags(): {}", cause);
                    return Err(Fail::new(libc::ERANGE, &cause));
                },
            }
        }
        Ok(result)
    }

    /// Builds the [EthernetConfig] descriptor. Options that are absent from the file keep their default values, but
    /// options that are present with the wrong type are reported.
    pub fn ethernet_config(&self) -> Result<EthernetConfig, Fail> {
        let section: &Yaml = self.get_ethernet_config()?;
        Ok(EthernetConfig::new(
            Self::get_optional_bool_option(section, ethernet_config::ENABLE_ARP)?,
            Self::get_optional_bool_option(section, ethernet_config::ENABLE_VLAN)?,
            Some(self.vlan_tags()?),
        ))
    }

    //==================================================================================================================
    // Static Functions
    //==================================================================================================================

    /// Similar to `get_typed_option` using `Yaml::as_hash` receiver. This method returns a `&Yaml` instead of
    /// yaml::Hash, and Yaml is more natural for indexing.
    fn get_subsection<'a>(yaml: &'a Yaml, index: &str) -> Result<&'a Yaml, Fail> {
        let section: &'a Yaml = Self::get_option(yaml, index)?;
        match section {
            Yaml::Hash(_) => Ok(section),
            _ => {
                let message: String = format!("parameter \"{}\" has unexpected type", index);
                Err(Fail::new(libc::EINVAL, message.as_str()))
            },
        }
    }

    /// Index `yaml` to find the value at `index`, validating that the index exists.
    fn get_option<'a>(yaml: &'a Yaml, index: &str) -> Result<&'a Yaml, Fail> {
        match yaml.index(index) {
            Yaml::BadValue => {
                let message: String = format!("missing configuration option \"{}\"", index);
                Err(Fail::new(libc::EINVAL, message.as_str()))
            },
            value => Ok(value),
        }
    }

    /// Index `yaml` to find the value at `index`, validating that it exists and that the receiver returns Some(_).
    fn get_typed_option<'a, T, Fn>(yaml: &'a Yaml, index: &str, receiver: Fn) -> Result<T, Fail>
    where
        Fn: FnOnce(&'a Yaml) -> Option<T>,
    {
        let option: &'a Yaml = Self::get_option(yaml, index)?;
        match receiver(option) {
            Some(value) => Ok(value),
            None => {
                let message: String = format!("parameter {} has unexpected type", index);
                Err(Fail::new(libc::EINVAL, message.as_str()))
            },
        }
    }

    /// Index `yaml` to find value at `index`, validating it as a string.
    fn get_typed_str_option<T, Fn>(yaml: &Yaml, index: &str, parser: Fn) -> Result<T, Fail>
    where
        Fn: FnOnce(&str) -> Option<T>,
    {
        let option: &Yaml = Self::get_option(yaml, index)?;
        if let Some(value) = option.as_str() {
            if let Some(value) = parser(value) {
                return Ok(value);
            }
        }
        let message: String = format!("parameter {} has unexpected type", index);
        Err(Fail::new(libc::EINVAL, message.as_str()))
    }

    /// Get value where the environment value overrides the config file if it exists.
    fn get_typed_env_option<T: FromStr>(index: &str) -> Result<Option<T>, Fail> {
        if let Ok(var) = ::std::env::var(index.to_uppercase()) {
            if let Ok(value) = var.as_str().parse() {
                return Ok(Some(value));
            } else {
                let message: String = format!("parameter {} has unexpected type", index);
                return Err(Fail::new(libc::EINVAL, message.as_str()));
            }
        }
        Ok(None)
    }

    /// Same as `Self::get_typed_option` using `Yaml::as_bool` as the receiver.
    fn get_bool_option(yaml: &Yaml, index: &str) -> Result<bool, Fail> {
        Self::get_typed_option(yaml, index, &Yaml::as_bool)
    }

    /// Like `Self::get_bool_option`, with the environment override, but a missing option yields `None`.
    fn get_optional_bool_option(yaml: &Yaml, index: &str) -> Result<Option<bool>, Fail> {
        if let Some(value) = Self::get_typed_env_option(index)? {
            return Ok(Some(value));
        }
        match yaml.index(index) {
            Yaml::BadValue => Ok(None),
            _ => Ok(Some(Self::get_bool_option(yaml, index)?)),
        }
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
