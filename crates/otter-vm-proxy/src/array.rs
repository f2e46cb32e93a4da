//! Array helpers used to marshal argument and key lists across the trap
//! boundary (ES §7.3.16 – §7.3.18)

use crate::context::NativeContext;
use crate::descriptor::well_known_key;
use crate::error::{VmError, VmResult};
use crate::gc::GcRef;
use crate::object::{JsObject, Object, PropertyAttributes, PropertyKey, PropertySlot};
use crate::value::Value;

/// Largest length an array-like may report (2^53 - 1)
const MAX_SAFE_LENGTH: f64 = 9_007_199_254_740_991.0;

/// Largest array-like turned into a list (the array length limit)
const MAX_LIST_LENGTH: u64 = u32::MAX as u64;

/// CreateArrayFromList
pub fn create_array_from_list(ncx: &NativeContext, elements: &[Value]) -> GcRef<JsObject> {
    let arr = ncx.new_array();
    for (i, element) in elements.iter().enumerate() {
        arr.write_slot(PropertyKey::Index(i as u32), PropertySlot::data(element.clone()));
    }
    arr.write_slot(
        well_known_key::LENGTH.clone(),
        PropertySlot::data_with_attrs(
            Value::number(elements.len() as f64),
            PropertyAttributes {
                writable: true,
                enumerable: false,
                configurable: false,
            },
        ),
    );
    arr
}

/// LengthOfArrayLike: ToLength(Get(obj, "length"))
pub fn length_of_array_like(ncx: &mut NativeContext, obj: &Object) -> VmResult<u64> {
    let receiver = Value::Object(obj.clone());
    let len = obj.get(ncx, &well_known_key::LENGTH, &receiver)?;
    to_length(&len)
}

/// CreateListFromArrayLike
///
/// Element types are not filtered; callers that need property keys check
/// them afterwards. Lengths beyond the array length limit are a `RangeError`.
pub fn create_list_from_array_like(ncx: &mut NativeContext, value: &Value) -> VmResult<Vec<Value>> {
    let obj = value
        .as_object()
        .ok_or_else(|| VmError::type_error("CreateListFromArrayLike called on non-object"))?;
    let len = length_of_array_like(ncx, &obj)?;
    if len > MAX_LIST_LENGTH {
        return Err(VmError::range_error(format!("Invalid array-like length {len}")));
    }
    let receiver = Value::Object(obj.clone());

    let mut list = Vec::with_capacity(len.min(1024) as usize);
    for i in 0..len {
        let key = index_key(i);
        list.push(obj.get(ncx, &key, &receiver)?);
    }
    Ok(list)
}

fn index_key(i: u64) -> PropertyKey {
    match u32::try_from(i) {
        Ok(n) if n != u32::MAX => PropertyKey::Index(n),
        _ => PropertyKey::string(&i.to_string()),
    }
}

/// ToLength over the primitive values this crate can convert without
/// calling into user code
fn to_length(value: &Value) -> VmResult<u64> {
    let n = match value {
        Value::Undefined | Value::Null => 0.0,
        Value::Boolean(b) => f64::from(u8::from(*b)),
        Value::Number(n) => *n,
        Value::String(s) => string_to_number(s.as_str()),
        Value::Symbol(_) => {
            return Err(VmError::type_error("Cannot convert a Symbol value to a number"));
        }
        Value::Object(_) => {
            return Err(VmError::type_error("Cannot convert object length to a number"));
        }
    };
    if n.is_nan() || n <= 0.0 {
        return Ok(0);
    }
    Ok(n.trunc().min(MAX_SAFE_LENGTH) as u64)
}

/// StringToNumber (ES §7.1.4.1.1)
fn string_to_number(s: &str) -> f64 {
    let s = s.trim();
    match s {
        "" => return 0.0,
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    let radix = match s.get(..2) {
        Some("0x" | "0X") => 16,
        Some("0o" | "0O") => 8,
        Some("0b" | "0B") => 2,
        _ => 10,
    };
    if radix != 10 {
        let digits = &s[2..];
        if digits.is_empty() {
            return f64::NAN;
        }
        return digits
            .chars()
            .try_fold(0.0, |acc, c| {
                c.to_digit(radix)
                    .map(|d| acc * f64::from(radix) + f64::from(d))
            })
            .unwrap_or(f64::NAN);
    }

    // Rust's float grammar also admits `inf` and `nan` spellings
    let decimal = s
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'));
    if !decimal {
        return f64::NAN;
    }
    s.parse().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::VmRuntime;

    #[test]
    fn test_array_from_list() {
        let mut ncx = VmRuntime::new().create_context();
        let arr = create_array_from_list(&ncx, &[Value::int32(1), Value::from("a")]);
        assert!(arr.is_array());
        let obj = Object::Ordinary(arr.clone());
        assert_eq!(length_of_array_like(&mut ncx, &obj).unwrap(), 2);
        assert_eq!(arr.get_own_value(&PropertyKey::Index(1)), Some(Value::from("a")));
        assert!(!arr.get_own_slot(&well_known_key::LENGTH).unwrap().attributes().enumerable);
    }

    #[test]
    fn test_list_from_array_like_object() {
        let mut ncx = VmRuntime::new().create_context();
        let obj = ncx.new_object();
        obj.set(PropertyKey::string("length"), Value::from("2"));
        obj.set(PropertyKey::Index(0), Value::from("x"));
        let list = create_list_from_array_like(&mut ncx, &Value::object(obj)).unwrap();
        // Index 1 is missing
        assert_eq!(list, vec![Value::from("x"), Value::Undefined]);
    }

    #[test]
    fn test_list_from_array_like_any() {
        let mut ncx = VmRuntime::new().create_context();
        let arr = create_array_from_list(&ncx, &[Value::int32(7), Value::Null]);
        let list = create_list_from_array_like(&mut ncx, &Value::object(arr)).unwrap();
        assert_eq!(list, vec![Value::int32(7), Value::Null]);
    }

    #[test]
    fn test_to_length_clamps() {
        assert_eq!(to_length(&Value::number(-3.0)).unwrap(), 0);
        assert_eq!(to_length(&Value::number(f64::NAN)).unwrap(), 0);
        assert_eq!(to_length(&Value::number(2.9)).unwrap(), 2);
        assert_eq!(to_length(&Value::number(f64::INFINITY)).unwrap(), 9_007_199_254_740_991);
        assert!(to_length(&Value::symbol(crate::value::Symbol::new(None))).is_err());
    }

    #[test]
    fn test_string_lengths() {
        let len = |s: &str| to_length(&Value::from(s)).unwrap();
        assert_eq!(len(" 3 "), 3);
        assert_eq!(len(""), 0);
        assert_eq!(len("0x10"), 16);
        assert_eq!(len("0b101"), 5);
        assert_eq!(len("0o17"), 15);
        assert_eq!(len("1e2"), 100);
        assert_eq!(len("Infinity"), 9_007_199_254_740_991);
        for nan in ["inf", "infinity", "INFINITY", "nan", "NaN", "0x", "0xg", "12px"] {
            assert_eq!(len(nan), 0, "{nan:?}");
        }
    }

    #[test]
    fn test_oversized_array_like_is_range_error() {
        let mut ncx = VmRuntime::new().create_context();
        let obj = ncx.new_object();
        obj.set(PropertyKey::string("length"), Value::number(9_007_199_254_740_991.0));
        let err = create_list_from_array_like(&mut ncx, &Value::object(obj.clone())).unwrap_err();
        assert!(matches!(err, VmError::RangeError(_)));

        obj.set(PropertyKey::string("length"), Value::number(4_294_967_296.0));
        let err = create_list_from_array_like(&mut ncx, &Value::object(obj)).unwrap_err();
        assert!(matches!(err, VmError::RangeError(_)));
    }

    #[test]
    fn test_non_object_rejected() {
        let mut ncx = VmRuntime::new().create_context();
        assert!(create_list_from_array_like(&mut ncx, &Value::int32(1)).is_err());
    }
}
