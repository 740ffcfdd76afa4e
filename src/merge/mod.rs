//! Field inheritance merge
//!
//! Three projections over an instance and its resolved prototype:
//!
//! - [`load_effective`]: the runtime view: prototype values filled in for
//!   every unset or blank inheritable field, with the derived `customised`
//!   flag.
//! - [`prepare_for_save`]: the storage view: blank or explicitly
//!   un-customised inheritable fields are unset rather than persisted, so a
//!   later prototype edit flows through instead of being frozen by a stale
//!   duplicate value.
//! - [`export_delta`]: the interchange view: only non-inheritable fields
//!   and genuine overrides.

use thiserror::Error;

use crate::exercise::Exercise;
use crate::field::{Field, FieldMap, FieldTypeError, FieldValue};

/// Sentinel text value for the sandbox field meaning "use the system
/// default"; normalized to unset on save
pub const SANDBOX_DEFAULT_SENTINEL: &str = "DEFAULT";

#[derive(Debug, Error)]
pub enum MergeError {
    /// A non-prototype instance was merged without a resolved prototype
    #[error("exercise of type '{0}' is not a prototype and no prototype was supplied")]
    PrototypeRequired(String),

    #[error(transparent)]
    FieldType(#[from] FieldTypeError),
}

/// The fully resolved runtime view of an instance
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveConfig {
    pub fields: FieldMap,
    /// True iff at least one inheritable field genuinely overrides the
    /// prototype; prototypes are always customised (self-contained)
    pub customised: bool,
}

/// The field values to persist on save; unset inheritable fields mean
/// "defer to the prototype"
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRecord {
    pub fields: FieldMap,
}

/// Merge prototype values into an instance, producing the effective view.
///
/// A prototype instance is self-contained: inheritance is skipped entirely
/// and `customised` is unconditionally true. Otherwise a resolved prototype
/// is required.
///
/// A concrete instance value whose field the prototype leaves unset counts
/// as an override. Prototype rows normally carry every inheritable field,
/// so the case only arises with sparse prototypes; treating it as customised
/// keeps the value from being silently dropped on a later save.
pub fn load_effective(
    instance: &Exercise,
    prototype: Option<&Exercise>,
) -> Result<EffectiveConfig, MergeError> {
    if instance.is_prototype() {
        return Ok(EffectiveConfig {
            fields: instance.fields.clone(),
            customised: true,
        });
    }
    let prototype = prototype
        .ok_or_else(|| MergeError::PrototypeRequired(instance.type_name.clone()))?;

    let mut fields = instance.fields.clone();
    let mut customised = false;
    for &field in Field::ALL {
        if !field.is_inheritable() {
            continue;
        }
        let own = instance
            .fields
            .get(field)
            .filter(|v| !v.is_blank())
            .cloned();
        let inherited = prototype.fields.get(field).cloned();
        match (own, inherited) {
            // A concrete value differing from the prototype is an override.
            (Some(own), Some(inherited)) if own != inherited => customised = true,
            // Equal, blank or unset: the prototype's value stands.
            (_, Some(inherited)) => fields.set(field, inherited)?,
            // The prototype is silent; a concrete value still counts as an
            // override, a blank one resolves to unset.
            (Some(_), None) => customised = true,
            (None, None) => {
                fields.unset(field);
            }
        }
    }
    Ok(EffectiveConfig { fields, customised })
}

/// Compute the values to persist for an instance.
///
/// For a non-prototype, an inheritable field is unset when its supplied
/// value is blank, or wholesale when the caller turned customisation off.
/// The sandbox default sentinel is unset unconditionally. Idempotent.
pub fn prepare_for_save(instance: &Exercise, explicit_customise: bool) -> SaveRecord {
    let mut fields = instance.fields.clone();
    if !instance.is_prototype() {
        let defers_all = !explicit_customise;
        for &field in Field::ALL {
            if !field.is_inheritable() {
                continue;
            }
            let blank = fields.get(field).map_or(true, FieldValue::is_blank);
            if blank || defers_all {
                fields.unset(field);
            }
        }
    }
    if fields.get_text(Field::Sandbox).map(str::trim) == Some(SANDBOX_DEFAULT_SENTINEL) {
        fields.unset(Field::Sandbox);
    }
    SaveRecord { fields }
}

/// Project the minimal field set needed to reconstruct the instance given
/// its prototype: every non-inheritable field, plus inheritable fields whose
/// value differs from the prototype's. A prototype exports its full map.
pub fn export_delta(
    instance: &Exercise,
    prototype: Option<&Exercise>,
) -> Result<FieldMap, MergeError> {
    if instance.is_prototype() {
        return Ok(instance.fields.clone());
    }
    let prototype = prototype
        .ok_or_else(|| MergeError::PrototypeRequired(instance.type_name.clone()))?;

    let mut delta = FieldMap::new();
    for (field, value) in instance.fields.iter() {
        let inherited_unchanged =
            field.is_inheritable() && prototype.fields.get(field) == Some(value);
        if !inherited_unchanged {
            delta.set(field, value.clone())?;
        }
    }
    Ok(delta)
}
