//! Flat property maps consumed by the external render engine.
//!
//! A field is written as a `type = "grin"` entry plus `grin.*` keys. The
//! same map can be read back into a validated [`GrinField`], which is how a
//! render session reconstructs fields from exported parameters.

use std::collections::BTreeMap;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::error::{GrinError, GrinResult};
use crate::field::{GrinField, GrinFieldBuilder};
use crate::profile::ProfileKind;

/// Property keys understood by the engine.
pub mod keys {
    pub const TYPE: &str = "type";
    pub const IOR_MIN: &str = "grin.iormin";
    pub const IOR_MAX: &str = "grin.iormax";
    pub const R_MIN: &str = "grin.rmin";
    pub const R_MAX: &str = "grin.rmax";
    pub const CENTER: &str = "grin.center";
    pub const PROFILE: &str = "grin.profile";
    pub const BETA: &str = "grin.beta";
    pub const GAMMA: &str = "grin.gamma";
    pub const STEP_SIZE: &str = "grin.stepsize";
    pub const NUM_STEPS: &str = "grin.numsteps";
    pub const INVERT: &str = "grin.invert";
    pub const STRETCH: &str = "grin.stretch";
}

/// Value type of the `type` key.
pub const GRIN_TYPE: &str = "grin";

/// A single property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Floats(Vec<f64>),
    Str(String),
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Float(value)
    }
}

impl From<DVec3> for PropertyValue {
    fn from(value: DVec3) -> Self {
        PropertyValue::Floats(value.to_array().to_vec())
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Str(value.to_string())
    }
}

/// Ordered key/value map, so exports are stable.
pub type PropertyMap = BTreeMap<String, PropertyValue>;

impl GrinField {
    /// Serialize the field into engine properties.
    pub fn to_properties(&self) -> PropertyMap {
        let mut props = PropertyMap::new();
        let mut set = |key: &str, value: PropertyValue| {
            props.insert(key.to_string(), value);
        };

        set(keys::TYPE, GRIN_TYPE.into());
        set(keys::IOR_MIN, self.ior_inner().into());
        set(keys::IOR_MAX, self.ior_outer().into());
        set(keys::R_MIN, self.r_inner().into());
        set(keys::R_MAX, self.r_outer().into());
        set(keys::CENTER, self.center().into());
        set(keys::PROFILE, self.profile().as_str().into());
        set(keys::BETA, self.beta().into());
        set(keys::GAMMA, self.gamma().into());
        set(keys::STEP_SIZE, self.step_size().into());
        set(keys::NUM_STEPS, PropertyValue::Int(i64::from(self.step_limit())));
        set(keys::INVERT, PropertyValue::Bool(self.invert_polarity()));
        if self.profile() == ProfileKind::Radial {
            set(keys::STRETCH, self.stretch().into());
        }

        props
    }

    /// Rebuild a validated field from engine properties.
    ///
    /// `grin.center`, `grin.invert` and `grin.stretch` are optional; every
    /// other key is required. Scalars are accepted where a 3-vector is
    /// expected and broadcast across axes.
    pub fn from_properties(props: &PropertyMap) -> GrinResult<GrinField> {
        let kind = string(props, keys::TYPE)?;
        if kind != GRIN_TYPE {
            return Err(GrinError::WrongVolumeType(kind.to_string()));
        }

        let defaults = GrinFieldBuilder::default();
        let builder = GrinFieldBuilder {
            ior_inner: vec3(props, keys::IOR_MIN)?,
            ior_outer: vec3(props, keys::IOR_MAX)?,
            r_inner: float(props, keys::R_MIN)?,
            r_outer: float(props, keys::R_MAX)?,
            center: optional(props, keys::CENTER, vec3)?.unwrap_or(defaults.center),
            profile: string(props, keys::PROFILE)?.parse()?,
            beta: float(props, keys::BETA)?,
            gamma: vec3(props, keys::GAMMA)?,
            stretch: optional(props, keys::STRETCH, vec3)?.unwrap_or(defaults.stretch),
            step_size: float(props, keys::STEP_SIZE)?,
            step_limit: count(props, keys::NUM_STEPS)?,
            invert_polarity: optional(props, keys::INVERT, boolean)?
                .unwrap_or(defaults.invert_polarity),
        };

        builder.build()
    }
}

fn lookup<'a>(props: &'a PropertyMap, key: &str) -> GrinResult<&'a PropertyValue> {
    props
        .get(key)
        .ok_or_else(|| GrinError::MissingProperty(key.to_string()))
}

fn optional<T>(
    props: &PropertyMap,
    key: &str,
    read: fn(&PropertyMap, &str) -> GrinResult<T>,
) -> GrinResult<Option<T>> {
    if props.contains_key(key) {
        read(props, key).map(Some)
    } else {
        Ok(None)
    }
}

fn wrong_type(key: &str, expected: &'static str) -> GrinError {
    GrinError::PropertyType {
        key: key.to_string(),
        expected,
    }
}

fn string<'a>(props: &'a PropertyMap, key: &str) -> GrinResult<&'a str> {
    match lookup(props, key)? {
        PropertyValue::Str(s) => Ok(s),
        _ => Err(wrong_type(key, "string")),
    }
}

fn float(props: &PropertyMap, key: &str) -> GrinResult<f64> {
    match lookup(props, key)? {
        PropertyValue::Float(x) => Ok(*x),
        PropertyValue::Int(i) => Ok(*i as f64),
        PropertyValue::Floats(v) if v.len() == 1 => Ok(v[0]),
        _ => Err(wrong_type(key, "number")),
    }
}

fn vec3(props: &PropertyMap, key: &str) -> GrinResult<DVec3> {
    match lookup(props, key)? {
        PropertyValue::Float(x) => Ok(DVec3::splat(*x)),
        PropertyValue::Int(i) => Ok(DVec3::splat(*i as f64)),
        PropertyValue::Floats(v) => match v.as_slice() {
            [x] => Ok(DVec3::splat(*x)),
            [x, y, z] => Ok(DVec3::new(*x, *y, *z)),
            _ => Err(wrong_type(key, "1 or 3 numbers")),
        },
        _ => Err(wrong_type(key, "1 or 3 numbers")),
    }
}

/// Step counts were historically exported as floats; whole floats are accepted.
fn count(props: &PropertyMap, key: &str) -> GrinResult<u32> {
    let value = match lookup(props, key)? {
        PropertyValue::Int(i) => *i as f64,
        PropertyValue::Float(x) if x.fract() == 0.0 => *x,
        _ => return Err(wrong_type(key, "non-negative integer")),
    };
    if !(0.0..=f64::from(u32::MAX)).contains(&value) {
        return Err(wrong_type(key, "non-negative integer"));
    }
    Ok(value as u32)
}

fn boolean(props: &PropertyMap, key: &str) -> GrinResult<bool> {
    match lookup(props, key)? {
        PropertyValue::Bool(b) => Ok(*b),
        PropertyValue::Int(i) => Ok(*i != 0),
        _ => Err(wrong_type(key, "bool")),
    }
}
