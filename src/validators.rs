// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 TestBox

//! Structural guards over untrusted parsed JSON.
//!
//! Every guard enforces a closed-world schema: all required keys present, no
//! keys beyond the allowed set, the `version` discriminant equal to the one
//! supported literal, and per-field primitive types. Unexpected fields are a
//! hard rejection rather than silently ignored; that catches both tampering
//! and version skew between the SDK and TestBox.
//!
//! The trial-shaped guards compose: [`is_trial`] requires
//! [`is_admin_authentication`] and an array where every element satisfies
//! [`is_user`]. All of them accept optional extras guards via [`TrialGuards`],
//! so the closed-world check still passes when partner-specific `extras`
//! fields are explicitly declared and guarded.

use serde_json::{Map, Value};

/// The single protocol version this SDK understands.
pub const SUPPORTED_VERSION: u64 = 1;

/// Predicate over an untrusted JSON value.
pub type GuardFn = dyn Fn(&Value) -> bool;

/// Pluggable guards for partner-specific extension fields.
///
/// When a guard is absent, the corresponding `extras` field (or
/// `start_url_context`) is only required to be a JSON object.
#[derive(Default, Clone, Copy)]
pub struct TrialGuards<'g> {
    /// Guard for `start_url_context`.
    pub start_url_context: Option<&'g GuardFn>,
    /// Guard for `secret_context.extras`.
    pub secret_extras: Option<&'g GuardFn>,
    /// Guard for `admin_authentication.extras`.
    pub admin_extras: Option<&'g GuardFn>,
    /// Guard for `user.extras` (admin user and trial users alike).
    pub user_extras: Option<&'g GuardFn>,
}

fn only_valid_keys(obj: &Map<String, Value>, allowed: &[&str]) -> bool {
    obj.keys().all(|k| allowed.contains(&k.as_str()))
}

fn has_all_keys(obj: &Map<String, Value>, required: &[&str]) -> bool {
    required.iter().all(|k| obj.contains_key(*k))
}

fn has_supported_version(obj: &Map<String, Value>) -> bool {
    obj.get("version").and_then(Value::as_u64) == Some(SUPPORTED_VERSION)
}

fn has_trial_id(obj: &Map<String, Value>) -> bool {
    obj.get("trial_id")
        .and_then(Value::as_str)
        .is_some_and(|id| !id.is_empty())
}

fn is_string(value: Option<&Value>) -> bool {
    value.is_some_and(Value::is_string)
}

fn extras_ok(obj: &Map<String, Value>, guard: Option<&GuardFn>) -> bool {
    match obj.get("extras") {
        None => true,
        Some(extras) => match guard {
            Some(guard) => guard(extras),
            None => extras.is_object(),
        },
    }
}

/// Guard for the minimal authenticated-request envelope `{version, trial_id}`.
///
/// The envelope guard checks required keys only; the concrete request guards
/// below add the closed-world key check for their full shapes.
pub fn is_authenticated_request(value: &Value) -> bool {
    let Some(obj) = value.as_object() else {
        return false;
    };
    has_all_keys(obj, &["version", "trial_id"])
        && has_supported_version(obj)
        && has_trial_id(obj)
}

/// Guard for a trial request `{version, trial_id, success_url, failure_url}`.
pub fn is_trial_request(value: &Value) -> bool {
    let Some(obj) = value.as_object() else {
        return false;
    };
    let keys = ["version", "trial_id", "success_url", "failure_url"];
    has_all_keys(obj, &keys)
        && only_valid_keys(obj, &keys)
        && has_supported_version(obj)
        && has_trial_id(obj)
        && is_string(obj.get("success_url"))
        && is_string(obj.get("failure_url"))
}

/// Guard for a use-case request.
pub fn is_use_case_request(value: &Value) -> bool {
    let Some(obj) = value.as_object() else {
        return false;
    };
    let keys = [
        "version",
        "trial_id",
        "use_case_type",
        "trial_data",
        "success_url",
        "failure_url",
    ];
    has_all_keys(obj, &keys)
        && only_valid_keys(obj, &keys)
        && has_supported_version(obj)
        && has_trial_id(obj)
        && is_string(obj.get("use_case_type"))
        && is_string(obj.get("success_url"))
        && is_string(obj.get("failure_url"))
        && obj
            .get("trial_data")
            .is_some_and(|t| is_trial(t, &TrialGuards::default()))
}

/// Guard for a bulk use-case request.
///
/// Both callback URLs are validated here. (A historical version of this guard
/// only reached `failure_url`; the evident intent is to check both.)
pub fn is_bulk_use_case_request(value: &Value) -> bool {
    let Some(obj) = value.as_object() else {
        return false;
    };
    let keys = [
        "version",
        "trial_id",
        "use_case_types",
        "trial_data",
        "success_url",
        "failure_url",
    ];
    has_all_keys(obj, &keys)
        && only_valid_keys(obj, &keys)
        && has_supported_version(obj)
        && has_trial_id(obj)
        && obj
            .get("use_case_types")
            .and_then(Value::as_array)
            .is_some_and(|types| types.iter().all(Value::is_string))
        && is_string(obj.get("success_url"))
        && is_string(obj.get("failure_url"))
        && obj
            .get("trial_data")
            .is_some_and(|t| is_trial(t, &TrialGuards::default()))
}

/// Guard for a [`User`](crate::models::User) shape.
pub fn is_user(value: &Value, guards: &TrialGuards<'_>) -> bool {
    let Some(obj) = value.as_object() else {
        return false;
    };
    only_valid_keys(obj, &["email", "password", "totp_token", "extras"])
        && is_string(obj.get("email"))
        && obj.get("password").is_none_or(Value::is_string)
        && obj.get("totp_token").is_none_or(Value::is_string)
        && extras_ok(obj, guards.user_extras)
}

/// Guard for a [`SecretContext`](crate::models::SecretContext) shape.
///
/// Absent and `null` values are acceptable: the secret context is optional.
pub fn is_secret_context(value: &Value, guards: &TrialGuards<'_>) -> bool {
    if value.is_null() {
        return true;
    }
    let Some(obj) = value.as_object() else {
        return false;
    };
    only_valid_keys(obj, &["sso_jwt_secret", "extras"])
        && obj.get("sso_jwt_secret").is_none_or(Value::is_string)
        && extras_ok(obj, guards.secret_extras)
}

/// Guard for an [`AdminAuthentication`](crate::models::AdminAuthentication) shape.
pub fn is_admin_authentication(value: &Value, guards: &TrialGuards<'_>) -> bool {
    let Some(obj) = value.as_object() else {
        return false;
    };
    only_valid_keys(obj, &["api_token", "user", "extras"])
        && obj.get("api_token").is_none_or(Value::is_string)
        && obj.get("user").is_some_and(|u| is_user(u, guards))
        && extras_ok(obj, guards.admin_extras)
}

/// Guard for a full [`Trial`](crate::trial::Trial) shape.
pub fn is_trial(value: &Value, guards: &TrialGuards<'_>) -> bool {
    let Some(obj) = value.as_object() else {
        return false;
    };
    let allowed = [
        "start_url_context",
        "secret_context",
        "admin_authentication",
        "trial_users",
        "created_at",
    ];
    if !only_valid_keys(obj, &allowed) {
        return false;
    }
    if !has_all_keys(obj, &["admin_authentication", "trial_users"]) {
        return false;
    }
    if !obj
        .get("admin_authentication")
        .is_some_and(|a| is_admin_authentication(a, guards))
    {
        return false;
    }
    let Some(users) = obj.get("trial_users").and_then(Value::as_array) else {
        return false;
    };
    if !users.iter().all(|u| is_user(u, guards)) {
        return false;
    }
    if let Some(context) = obj.get("secret_context") {
        if !is_secret_context(context, guards) {
            return false;
        }
    }
    if let Some(context) = obj.get("start_url_context") {
        let ok = match guards.start_url_context {
            Some(guard) => guard(context),
            None => context.is_object(),
        };
        if !ok {
            return false;
        }
    }
    obj.get("created_at").is_none_or(Value::is_string)
}
