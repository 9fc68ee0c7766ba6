/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use fake_engine::HostValue;
use godot::builtin::real;
use godot::prelude::*;
use proptest::prelude::*;

use crate::framework::itest;

#[derive(GodotClass)]
#[class(init)]
struct ByteSource {
    #[var]
    payload: PackedByteArray,
}

#[godot_api]
impl ByteSource {
    #[func]
    fn counting_bytes(&self, len: i64) -> PackedByteArray {
        (0..len).map(|i| i as u8).collect()
    }

    #[func]
    fn byte_sum(&self, bytes: PackedByteArray) -> i64 {
        bytes.view().iter().map(|&b| b as i64).sum()
    }
}

fn counting(n: usize) -> Vec<u8> {
    (0..n).map(|i| i as u8).collect()
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Views

#[itest]
fn packed_byte_array_view() {
    let bytes = counting(256);
    let array = PackedByteArray::from(bytes.as_slice());
    assert_eq!(array.len(), 256);

    let view = array.view();
    assert_eq!(view.len(), 256);
    assert_eq!(&*view, bytes.as_slice());
}

#[itest]
fn packed_byte_array_view_does_not_alias() {
    let mut array = PackedByteArray::from(counting(16));
    let copy = array.clone();

    let before: Vec<u8> = array.view().to_vec();
    array.set(0, 99);

    assert_eq!(before[0], 0);
    assert_eq!(array.view()[0], 99);
    assert_eq!(array.get(0), Some(99));

    // Copy-on-write: the clone keeps its own buffer.
    assert_eq!(&*copy.view(), counting(16).as_slice());
}

#[itest]
fn packed_array_edits() {
    let mut array = PackedInt32Array::new();
    assert!(array.is_empty());
    assert!(array.view().is_empty());

    array.push(3);
    array.push(-5);
    assert_eq!(array.to_vec(), vec![3, -5]);
    assert_eq!(array.get(2), None);

    array.resize(4);
    assert_eq!(array.to_vec(), vec![3, -5, 0, 0]);

    array.clear();
    assert_eq!(array.len(), 0);
}

#[itest]
fn packed_string_array_and_bytes_of_str() {
    let strings: PackedStringArray = ["a", "bc"].into_iter().map(GString::from).collect();
    assert_eq!(strings.get(1), Some(GString::from("bc")));

    let bytes = PackedByteArray::from("hé");
    assert_eq!(bytes.to_bytes(), "hé".as_bytes());
}

#[itest]
fn packed_array_through_methods() {
    let source = ByteSource::new_gd();
    let id = source.instance_id().to_u64();

    let returned = fake_engine::ptrcall_method(id, "counting_bytes", &[HostValue::Int(4)]);
    assert_eq!(returned, Ok(HostValue::PackedBytes(vec![0, 1, 2, 3])));

    let returned = fake_engine::call_method(id, "byte_sum", &[HostValue::PackedBytes(vec![1, 2, 3])]);
    assert_eq!(returned, Ok(HostValue::Int(6)));

    fake_engine::set_property(id, "payload", HostValue::PackedBytes(vec![7, 8])).unwrap();
    assert_eq!(source.bind().payload.to_vec(), vec![7, 8]);
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Conversion laws

fn transform_from_reals(r: [real; 12]) -> Transform3D {
    Transform3D::from_cols(
        Vector3::new(r[0], r[1], r[2]),
        Vector3::new(r[3], r[4], r[5]),
        Vector3::new(r[6], r[7], r[8]),
        Vector3::new(r[9], r[10], r[11]),
    )
}

fn transform_bits(t: &Transform3D) -> Vec<u64> {
    let [a, b, c] = [t.basis.col_a(), t.basis.col_b(), t.basis.col_c()];
    [a, b, c, t.origin]
        .iter()
        .flat_map(|v| [v.x, v.y, v.z])
        .map(|x| x.to_bits() as u64)
        .collect()
}

#[itest]
fn gstring_utf8_round_trip() {
    proptest!(|(text in any::<String>())| {
        let gstring = GString::from(text.as_str());
        prop_assert_eq!(gstring.to_string(), text.clone());
        prop_assert_eq!(gstring.to_utf8_bytes(), text.into_bytes());
    });
}

#[itest]
fn packed_int32_round_trip() {
    proptest!(|(values in proptest::collection::vec(any::<i32>(), 0..64))| {
        let array = PackedInt32Array::from(values.clone());
        prop_assert_eq!(array.to_vec(), values.clone());

        let through_variant: PackedInt32Array = array.to_variant().to();
        prop_assert_eq!(&*through_variant.view(), values.as_slice());
    });
}

#[itest]
fn transform3d_variant_is_bit_exact() {
    proptest!(|(reals in proptest::array::uniform12(any::<real>()))| {
        let transform = transform_from_reals(reals);
        let back: Transform3D = transform.to_variant().to();
        prop_assert_eq!(transform_bits(&back), transform_bits(&transform));
    });
}

#[itest]
fn float_variant_is_bit_exact() {
    proptest!(|(bits in any::<u64>())| {
        let value = f64::from_bits(bits);
        let back: f64 = value.to_variant().to();
        prop_assert_eq!(back.to_bits(), bits);
    });
}

#[itest]
fn int_and_bool_variants_round_trip() {
    proptest!(|(int in any::<i64>(), flag in any::<bool>())| {
        prop_assert_eq!(int.to_variant().to::<i64>(), int);
        prop_assert_eq!(flag.to_variant().to::<bool>(), flag);
    });
}

#[itest]
fn nan_variant_keeps_payload() {
    let nan = f64::from_bits(0x7ff8_0000_dead_beef);
    let back: f64 = Variant::from(nan).to();
    assert_eq!(back.to_bits(), nan.to_bits());
}

#[itest]
fn nil_converts_to_zero_value() {
    let nil = Variant::nil();
    assert!(nil.is_nil());
    assert_eq!(nil.to::<i64>(), 0);
    assert_eq!(nil.to::<f64>(), 0.0);
    assert!(!nil.to::<bool>());
    assert_eq!(nil.to::<GString>(), GString::new());
    assert!(nil.to::<PackedByteArray>().is_empty());
    assert_eq!(nil.to::<Vector3>(), Vector3::ZERO);
}
