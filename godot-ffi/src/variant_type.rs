/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate as sys;

macro_rules! variant_types {
    ( $( $Variant:ident = $sys:ident, $name:literal; )* ) => {
        /// Type tag stored in the first word of every `Variant`.
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
        #[repr(u32)]
        pub enum VariantType {
            #[default]
            Nil = sys::GDEXTENSION_VARIANT_TYPE_NIL,
            $( $Variant = sys::$sys, )*
        }

        impl VariantType {
            /// All types except `Nil`, in tag order.
            pub const BUILTINS: &'static [VariantType] = &[ $( VariantType::$Variant, )* ];

            /// Converts an engine tag. Unknown tags map to `Nil`.
            pub fn from_sys(tag: sys::GDExtensionVariantType) -> Self {
                match tag {
                    $( sys::$sys => Self::$Variant, )*
                    _ => Self::Nil,
                }
            }

            pub fn sys(self) -> sys::GDExtensionVariantType {
                self as sys::GDExtensionVariantType
            }

            /// Name as it appears in GDScript and in property hint strings.
            pub fn godot_name(self) -> &'static str {
                match self {
                    Self::Nil => "Nil",
                    $( Self::$Variant => $name, )*
                }
            }
        }
    };
}

variant_types! {
    Bool = GDEXTENSION_VARIANT_TYPE_BOOL, "bool";
    Int = GDEXTENSION_VARIANT_TYPE_INT, "int";
    Float = GDEXTENSION_VARIANT_TYPE_FLOAT, "float";
    String = GDEXTENSION_VARIANT_TYPE_STRING, "String";
    Vector2 = GDEXTENSION_VARIANT_TYPE_VECTOR2, "Vector2";
    Vector2i = GDEXTENSION_VARIANT_TYPE_VECTOR2I, "Vector2i";
    Rect2 = GDEXTENSION_VARIANT_TYPE_RECT2, "Rect2";
    Rect2i = GDEXTENSION_VARIANT_TYPE_RECT2I, "Rect2i";
    Vector3 = GDEXTENSION_VARIANT_TYPE_VECTOR3, "Vector3";
    Vector3i = GDEXTENSION_VARIANT_TYPE_VECTOR3I, "Vector3i";
    Transform2D = GDEXTENSION_VARIANT_TYPE_TRANSFORM2D, "Transform2D";
    Vector4 = GDEXTENSION_VARIANT_TYPE_VECTOR4, "Vector4";
    Vector4i = GDEXTENSION_VARIANT_TYPE_VECTOR4I, "Vector4i";
    Plane = GDEXTENSION_VARIANT_TYPE_PLANE, "Plane";
    Quaternion = GDEXTENSION_VARIANT_TYPE_QUATERNION, "Quaternion";
    Aabb = GDEXTENSION_VARIANT_TYPE_AABB, "AABB";
    Basis = GDEXTENSION_VARIANT_TYPE_BASIS, "Basis";
    Transform3D = GDEXTENSION_VARIANT_TYPE_TRANSFORM3D, "Transform3D";
    Projection = GDEXTENSION_VARIANT_TYPE_PROJECTION, "Projection";
    Color = GDEXTENSION_VARIANT_TYPE_COLOR, "Color";
    StringName = GDEXTENSION_VARIANT_TYPE_STRING_NAME, "StringName";
    NodePath = GDEXTENSION_VARIANT_TYPE_NODE_PATH, "NodePath";
    Rid = GDEXTENSION_VARIANT_TYPE_RID, "RID";
    Object = GDEXTENSION_VARIANT_TYPE_OBJECT, "Object";
    Callable = GDEXTENSION_VARIANT_TYPE_CALLABLE, "Callable";
    Signal = GDEXTENSION_VARIANT_TYPE_SIGNAL, "Signal";
    Dictionary = GDEXTENSION_VARIANT_TYPE_DICTIONARY, "Dictionary";
    Array = GDEXTENSION_VARIANT_TYPE_ARRAY, "Array";
    PackedByteArray = GDEXTENSION_VARIANT_TYPE_PACKED_BYTE_ARRAY, "PackedByteArray";
    PackedInt32Array = GDEXTENSION_VARIANT_TYPE_PACKED_INT32_ARRAY, "PackedInt32Array";
    PackedInt64Array = GDEXTENSION_VARIANT_TYPE_PACKED_INT64_ARRAY, "PackedInt64Array";
    PackedFloat32Array = GDEXTENSION_VARIANT_TYPE_PACKED_FLOAT32_ARRAY, "PackedFloat32Array";
    PackedFloat64Array = GDEXTENSION_VARIANT_TYPE_PACKED_FLOAT64_ARRAY, "PackedFloat64Array";
    PackedStringArray = GDEXTENSION_VARIANT_TYPE_PACKED_STRING_ARRAY, "PackedStringArray";
    PackedVector2Array = GDEXTENSION_VARIANT_TYPE_PACKED_VECTOR2_ARRAY, "PackedVector2Array";
    PackedVector3Array = GDEXTENSION_VARIANT_TYPE_PACKED_VECTOR3_ARRAY, "PackedVector3Array";
    PackedColorArray = GDEXTENSION_VARIANT_TYPE_PACKED_COLOR_ARRAY, "PackedColorArray";
    PackedVector4Array = GDEXTENSION_VARIANT_TYPE_PACKED_VECTOR4_ARRAY, "PackedVector4Array";
}

impl VariantType {
    /// Number of tags, including `Nil`.
    pub const MAX: usize = sys::GDEXTENSION_VARIANT_TYPE_VARIANT_MAX as usize;

    /// Index into per-type tables.
    pub fn ord(self) -> usize {
        self as usize
    }

    /// Whether values of this type are plain bytes that need no engine destructor.
    pub fn is_plain(self) -> bool {
        matches!(
            self,
            Self::Nil
                | Self::Bool
                | Self::Int
                | Self::Float
                | Self::Vector2
                | Self::Vector2i
                | Self::Rect2
                | Self::Rect2i
                | Self::Vector3
                | Self::Vector3i
                | Self::Transform2D
                | Self::Vector4
                | Self::Vector4i
                | Self::Plane
                | Self::Quaternion
                | Self::Aabb
                | Self::Basis
                | Self::Transform3D
                | Self::Projection
                | Self::Color
                | Self::Rid
        )
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

/// Operators evaluated through `variant_evaluate`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(u32)]
pub enum VariantOperator {
    Equal = sys::GDEXTENSION_VARIANT_OP_EQUAL,
    NotEqual = sys::GDEXTENSION_VARIANT_OP_NOT_EQUAL,
    Less = sys::GDEXTENSION_VARIANT_OP_LESS,
    LessEqual = sys::GDEXTENSION_VARIANT_OP_LESS_EQUAL,
    Greater = sys::GDEXTENSION_VARIANT_OP_GREATER,
    GreaterEqual = sys::GDEXTENSION_VARIANT_OP_GREATER_EQUAL,
}

impl VariantOperator {
    pub fn sys(self) -> sys::GDExtensionVariantOperator {
        self as sys::GDExtensionVariantOperator
    }

    pub fn from_sys(op: sys::GDExtensionVariantOperator) -> Option<Self> {
        let op = match op {
            sys::GDEXTENSION_VARIANT_OP_EQUAL => Self::Equal,
            sys::GDEXTENSION_VARIANT_OP_NOT_EQUAL => Self::NotEqual,
            sys::GDEXTENSION_VARIANT_OP_LESS => Self::Less,
            sys::GDEXTENSION_VARIANT_OP_LESS_EQUAL => Self::LessEqual,
            sys::GDEXTENSION_VARIANT_OP_GREATER => Self::Greater,
            sys::GDEXTENSION_VARIANT_OP_GREATER_EQUAL => Self::GreaterEqual,
            _ => return None,
        };
        Some(op)
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_match_engine_order() {
        assert_eq!(VariantType::BUILTINS.len() + 1, VariantType::MAX);

        for (i, ty) in VariantType::BUILTINS.iter().enumerate() {
            assert_eq!(ty.ord(), i + 1);
            assert_eq!(VariantType::from_sys(ty.sys()), *ty);
        }
    }

    #[test]
    fn unknown_tag_is_nil() {
        assert_eq!(VariantType::from_sys(999), VariantType::Nil);
    }

    #[test]
    fn godot_names() {
        assert_eq!(VariantType::Aabb.godot_name(), "AABB");
        assert_eq!(VariantType::Float.godot_name(), "float");
        assert_eq!(VariantType::PackedVector4Array.godot_name(), "PackedVector4Array");
    }
}
