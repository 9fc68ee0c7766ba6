/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use fake_engine::{HostValue, PropertyRecord};
use godot::builtin::VariantType;
use godot::meta::{PropertyHint, PropertyHintInfo, PropertyUsageFlags};
use godot::prelude::*;

use crate::framework::itest;

#[derive(GodotClass)]
#[class(init)]
struct Bar {
    #[export(range = (0, 100))]
    #[init(val = 10.0)]
    speed: f64,
}

#[derive(GodotClass)]
#[class(init, base = Node)]
struct HasProperty {
    #[var]
    int_val: i64,

    #[var]
    string_val: GString,

    #[export(range = (0, 10, 2))]
    stepped: i32,

    // Not a property.
    hidden: bool,

    base: Base<Node>,
}

#[derive(GodotClass)]
#[class(init)]
struct ObjectProperties {
    #[export]
    resource: Option<Gd<Resource>>,

    #[export]
    nodes: Array<Gd<Node>>,

    #[var]
    ints: Array<i64>,

    #[var]
    anything: Array<Variant>,
}

/// Handles properties that do not exist as fields.
#[derive(GodotClass)]
#[class(init)]
struct DynamicProperties {
    extra: i64,
}

#[godot_api]
impl IRefCounted for DynamicProperties {
    fn get_property(&self, property: StringName) -> Option<Variant> {
        (property == "extra").then(|| self.extra.to_variant())
    }

    fn set_property(&mut self, property: StringName, value: Variant) -> bool {
        if property != "extra" {
            return false;
        }

        self.extra = value.to();
        true
    }

    fn get_property_list(&mut self) -> Vec<PropertyInfo> {
        vec![PropertyInfo::new_var::<i64>("extra")]
    }

    fn property_get_revert(&self, property: StringName) -> Option<Variant> {
        (property == "extra").then(|| (-1i64).to_variant())
    }

    fn validate_property(&self, property: &mut PropertyInfo) {
        if property.property_name == "extra" {
            property.usage = PropertyUsageFlags::READ_ONLY | PropertyUsageFlags::EDITOR;
        }
    }
}

fn find<'a>(properties: &'a [PropertyRecord], name: &str) -> &'a PropertyRecord {
    properties
        .iter()
        .find(|p| p.name == name)
        .unwrap_or_else(|| panic!("property `{name}` not registered"))
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

#[itest]
fn property_export_range_reflection() {
    let properties = fake_engine::property_list("Bar");
    assert_eq!(properties.len(), 1, "{properties:?}");

    let speed = &properties[0];
    assert_eq!(speed.name, "speed");
    assert_eq!(speed.variant_type, VariantType::Float);
    assert_eq!(speed.hint, PropertyHint::RANGE.ord());
    assert_eq!(speed.hint_string, "0,100");
    assert_eq!(speed.usage, PropertyUsageFlags::DEFAULT.ord());
    assert_eq!(speed.getter, "get_speed");
    assert_eq!(speed.setter, "set_speed");

    let methods = fake_engine::method_names("Bar");
    assert_eq!(methods, vec!["get_speed".to_string(), "set_speed".to_string()]);
}

#[itest]
fn property_get_set_through_engine() {
    let bar = Bar::new_gd();
    let id = bar.instance_id().to_u64();

    assert_eq!(fake_engine::get_property(id, "speed"), Ok(HostValue::Float(10.0)));
    assert_eq!(fake_engine::set_property(id, "speed", HostValue::Float(55.5)), Ok(true));
    assert_eq!(bar.bind().speed, 55.5);

    assert_eq!(fake_engine::set_property(id, "no_such_property", HostValue::Int(1)), Ok(false));
    assert_eq!(fake_engine::get_property(id, "no_such_property"), Ok(HostValue::Nil));
}

#[itest]
fn property_revert_to_init_value() {
    let bar = Bar::new_gd();
    let id = bar.instance_id().to_u64();

    assert_eq!(fake_engine::property_get_revert(id, "speed"), Ok(Some(HostValue::Float(10.0))));
    assert_eq!(fake_engine::property_get_revert(id, "other"), Ok(None));
}

#[itest]
fn property_var_and_export_hints() {
    let properties = fake_engine::property_list("HasProperty");
    let names: Vec<&str> = properties.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["int_val", "string_val", "stepped"]);

    let int_val = find(&properties, "int_val");
    assert_eq!(int_val.variant_type, VariantType::Int);
    assert_eq!(int_val.hint, PropertyHint::NONE.ord());

    let string_val = find(&properties, "string_val");
    assert_eq!(string_val.variant_type, VariantType::String);

    let stepped = find(&properties, "stepped");
    assert_eq!(stepped.variant_type, VariantType::Int);
    assert_eq!(stepped.hint, PropertyHint::RANGE.ord());
    assert_eq!(stepped.hint_string, "0,10,2");

    let mut obj = HasProperty::new_alloc();
    obj.set("string_val", &GString::from("text").to_variant());
    obj.set("int_val", &(-4i64).to_variant());
    assert_eq!(obj.get("int_val"), (-4i64).to_variant());
    assert_eq!(obj.bind().string_val, GString::from("text"));
    assert!(!obj.bind().hidden);

    obj.free();
}

#[itest]
fn property_object_and_array_hints() {
    let properties = fake_engine::property_list("ObjectProperties");

    let resource = find(&properties, "resource");
    assert_eq!(resource.variant_type, VariantType::Object);
    assert_eq!(resource.hint, PropertyHint::RESOURCE_TYPE.ord());
    assert_eq!(resource.hint_string, "Resource");

    let nodes = find(&properties, "nodes");
    assert_eq!(nodes.variant_type, VariantType::Array);
    assert_eq!(nodes.hint, PropertyHint::ARRAY_TYPE.ord());
    assert_eq!(nodes.hint_string, "24/34:Node");

    let ints = find(&properties, "ints");
    assert_eq!(ints.hint, PropertyHint::ARRAY_TYPE.ord());
    assert_eq!(ints.hint_string, "int");

    let anything = find(&properties, "anything");
    assert_eq!(anything.hint, PropertyHint::NONE.ord());
}

#[itest]
fn property_user_callbacks() {
    let mut obj = DynamicProperties::new_gd();
    let id = obj.instance_id().to_u64();

    assert!(fake_engine::property_list("DynamicProperties").is_empty());

    obj.set("extra", &12i64.to_variant());
    assert_eq!(obj.bind().extra, 12);
    assert_eq!(fake_engine::get_property(id, "extra"), Ok(HostValue::Int(12)));
    assert_eq!(fake_engine::set_property(id, "extra", HostValue::Int(20)), Ok(true));
    assert_eq!(obj.get("extra"), 20i64.to_variant());

    assert_eq!(fake_engine::property_get_revert(id, "extra"), Ok(Some(HostValue::Int(-1))));
    assert_eq!(fake_engine::property_get_revert(id, "other"), Ok(None));

    let listed = fake_engine::validated_property_list(id).unwrap();
    let extra = find(&listed, "extra");
    assert_eq!(extra.variant_type, VariantType::Int);
    assert_eq!(
        extra.usage,
        (PropertyUsageFlags::READ_ONLY | PropertyUsageFlags::EDITOR).ord()
    );
}

#[itest]
fn property_info_builders() {
    let info = PropertyInfo::new_export::<f64>("speed").with_hint_info(PropertyHintInfo::range("1,2"));
    assert_eq!(info.variant_type, VariantType::Float);
    assert_eq!(info.hint_info.hint, PropertyHint::RANGE);
    assert_eq!(info.hint_info.hint_string, GString::from("1,2"));
}
