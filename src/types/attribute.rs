//! Caller-constructed descriptions of the resources being authorized.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::domain::{Action, ResourceType};

/// The basic descriptor shared by a resource and its ancestors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct Basic {
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub action: Action,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Numeric instance id; zero or less means "no instance yet".
    #[serde(default)]
    pub instance_id: i64,
    /// Secondary string id, preferred over `instance_id` by types that have one.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub instance_id_ex: String,
}

/// One ancestor of a resource, e.g. the model owning an attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct Layer {
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    pub instance_id: i64,
}

impl Layer {
    pub fn new(resource_type: ResourceType, instance_id: i64) -> Self {
        Layer {
            resource_type,
            name: String::new(),
            instance_id,
        }
    }
}

/// A resource plus the action requested on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct ResourceAttribute {
    #[serde(flatten)]
    pub basic: Basic,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub supplier_account: String,
    /// Business the resource belongs to; zero or less means none.
    #[serde(default)]
    pub business_id: i64,
    /// Ancestors ordered root to immediate parent.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub layers: Vec<Layer>,
}

impl ResourceAttribute {
    pub fn new(resource_type: ResourceType, action: Action) -> Self {
        ResourceAttribute {
            basic: Basic {
                resource_type,
                action,
                name: String::new(),
                instance_id: 0,
                instance_id_ex: String::new(),
            },
            supplier_account: String::new(),
            business_id: 0,
            layers: Vec::new(),
        }
    }

    pub fn with_instance(mut self, instance_id: i64) -> Self {
        self.basic.instance_id = instance_id;
        self
    }

    pub fn with_instance_ex(mut self, instance_id_ex: impl Into<String>) -> Self {
        self.basic.instance_id_ex = instance_id_ex.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.basic.name = name.into();
        self
    }

    pub fn with_business(mut self, business_id: i64) -> Self {
        self.business_id = business_id;
        self
    }

    pub fn with_supplier_account(mut self, supplier_account: impl Into<String>) -> Self {
        self.supplier_account = supplier_account.into();
        self
    }

    /// Append an ancestor below the ones already present.
    pub fn with_layer(mut self, resource_type: ResourceType, instance_id: i64) -> Self {
        self.layers.push(Layer::new(resource_type, instance_id));
        self
    }

    pub fn resource_type(&self) -> ResourceType {
        self.basic.resource_type
    }

    pub fn action(&self) -> Action {
        self.basic.action
    }
}

impl Display for ResourceAttribute {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "{}:{}({})",
            self.basic.resource_type, self.basic.action, self.basic.instance_id
        )?;
        if self.business_id > 0 {
            write!(f, "@biz{}", self.business_id)?;
        }
        Ok(())
    }
}

/// The user on whose behalf resources are authorized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct UserInfo {
    pub user_name: String,
    #[serde(default)]
    pub supplier_account: String,
}

impl UserInfo {
    pub fn new(user_name: impl Into<String>) -> Self {
        UserInfo {
            user_name: user_name.into(),
            supplier_account: String::new(),
        }
    }
}

/// A single-decision authorization request over several resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthAttribute {
    pub user: UserInfo,
    pub resources: Vec<ResourceAttribute>,
}
