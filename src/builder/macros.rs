//! Macros for ergonomic model declaration.

/// Generate a `Model` implementation for a plain struct.
///
/// Sections are optional but must appear in this order:
/// - `fields`: scalar members, read through `Into<Value>` and written back
///   through `FromValue`
/// - `nested`: members holding a single nested model
/// - `collections`: members holding a `Vec` of nested models
///
/// # Example
///
/// ```
/// use precept::core::{Model, Value};
/// use precept::model;
///
/// struct Line {
///     sku: String,
///     quantity: u32,
/// }
///
/// struct Order {
///     reference: String,
///     notes: Option<String>,
///     lines: Vec<Line>,
/// }
///
/// model! {
///     Line {
///         fields: [sku, quantity],
///     }
/// }
///
/// model! {
///     Order {
///         fields: [reference, notes],
///         collections: [lines],
///     }
/// }
///
/// let order = Order { reference: "A-1".into(), notes: None, lines: vec![] };
/// assert_eq!(order.get("notes"), Some(Value::Null));
/// assert_eq!(Order::members(), &["reference", "notes", "lines"]);
/// ```
#[macro_export]
macro_rules! model {
    (
        $name:ident {
            $(fields: [$($field:ident),* $(,)?] $(,)?)?
            $(nested: [$($child:ident),* $(,)?] $(,)?)?
            $(collections: [$($many:ident),* $(,)?] $(,)?)?
        }
    ) => {
        impl $crate::core::Model for $name {
            fn describe() -> $crate::core::ModelType {
                $crate::core::ModelType::of::<Self>(stringify!($name))
            }

            fn members() -> &'static [&'static str] {
                &[
                    $($(stringify!($field),)*)?
                    $($(stringify!($child),)*)?
                    $($(stringify!($many),)*)?
                ]
            }

            fn model_type(&self) -> $crate::core::ModelType {
                <Self as $crate::core::Model>::describe()
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn get(&self, member: &str) -> ::std::option::Option<$crate::core::Value> {
                match member {
                    $($(
                        stringify!($field) => ::std::option::Option::Some(
                            $crate::core::Value::from(::std::clone::Clone::clone(&self.$field)),
                        ),
                    )*)?
                    $($(
                        stringify!($child) => ::std::option::Option::Some(
                            $crate::core::Value::Model(
                                $crate::core::Model::model_type(&self.$child).name().to_string(),
                            ),
                        ),
                    )*)?
                    $($(
                        stringify!($many) => ::std::option::Option::Some($crate::core::Value::List(
                            self.$many
                                .iter()
                                .map(|item| {
                                    $crate::core::Value::Model(
                                        $crate::core::Model::model_type(item).name().to_string(),
                                    )
                                })
                                .collect(),
                        )),
                    )*)?
                    _ => ::std::option::Option::None,
                }
            }

            fn set(&mut self, member: &str, value: $crate::core::Value) -> bool {
                match member {
                    $($(
                        stringify!($field) => match $crate::core::FromValue::from_value(value) {
                            ::std::option::Option::Some(converted) => {
                                self.$field = converted;
                                true
                            }
                            ::std::option::Option::None => false,
                        },
                    )*)?
                    _ => {
                        let _ = value;
                        false
                    }
                }
            }

            fn children_mut(
                &mut self,
                member: &str,
            ) -> ::std::option::Option<$crate::core::Children<'_>> {
                match member {
                    $($(
                        stringify!($child) => ::std::option::Option::Some(
                            $crate::core::Children::One(&mut self.$child),
                        ),
                    )*)?
                    $($(
                        stringify!($many) => ::std::option::Option::Some(
                            $crate::core::Children::Many(
                                self.$many
                                    .iter_mut()
                                    .map(|item| item as &mut dyn $crate::core::Model)
                                    .collect(),
                            ),
                        ),
                    )*)?
                    _ => ::std::option::Option::None,
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{Children, Model, Value};

    struct Address {
        city: String,
    }

    struct Customer {
        name: String,
        age: Option<u32>,
        tags: Vec<String>,
        address: Address,
        previous: Vec<Address>,
    }

    model! {
        Address {
            fields: [city],
        }
    }

    model! {
        Customer {
            fields: [name, age, tags],
            nested: [address],
            collections: [previous],
        }
    }

    fn customer() -> Customer {
        Customer {
            name: "Ada".to_string(),
            age: None,
            tags: vec!["vip".to_string()],
            address: Address {
                city: "London".to_string(),
            },
            previous: vec![
                Address {
                    city: "Paris".to_string(),
                },
                Address {
                    city: "Rome".to_string(),
                },
            ],
        }
    }

    #[test]
    fn model_macro_generates_getters() {
        let customer = customer();

        assert_eq!(customer.get("name"), Some(Value::from("Ada")));
        assert_eq!(customer.get("age"), Some(Value::Null));
        assert_eq!(customer.get("tags"), Some(Value::from(vec!["vip"])));
        assert_eq!(
            customer.get("address"),
            Some(Value::Model("Address".to_string()))
        );
        assert_eq!(customer.get("previous").and_then(|v| v.len()), Some(2));
        assert_eq!(customer.get("unknown"), None);
    }

    #[test]
    fn model_macro_generates_setters() {
        let mut customer = customer();

        assert!(customer.set("name", Value::from("Grace")));
        assert!(customer.set("age", Value::Int(36)));
        assert!(!customer.set("name", Value::Int(1)));
        assert!(!customer.set("address", Value::Null));

        assert_eq!(customer.name, "Grace");
        assert_eq!(customer.age, Some(36));
    }

    #[test]
    fn model_macro_exposes_children() {
        let mut customer = customer();

        match customer.children_mut("previous") {
            Some(Children::Many(children)) => {
                assert_eq!(children.len(), 2);
                assert_eq!(children[1].get("city"), Some(Value::from("Rome")));
            }
            _ => panic!("expected a collection"),
        }

        assert!(matches!(
            customer.children_mut("address"),
            Some(Children::One(_))
        ));
        assert!(customer.children_mut("name").is_none());
    }

    #[test]
    fn model_macro_lists_members_in_order() {
        assert_eq!(
            Customer::members(),
            &["name", "age", "tags", "address", "previous"]
        );
        assert_eq!(Customer::describe().name(), "Customer");
    }
}
