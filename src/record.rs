//! The `graphql_record!` registration macro.
//!
//! Declares a struct and registers it as a decodable record in one go: the
//! macro emits the struct definition plus [`Record`](crate::Record) and
//! [`Target`](crate::Target) impls backed by a static field table.
//!
//! Field forms:
//!
//! - `name: Ty` - matched against JSON keys by identifier, case-insensitively
//! - `"tag" name: Ty` - matched by the tag-derived name, case-sensitively;
//!   the tag grammar is `name[(args)][: alias]`, and a tag starting with
//!   `...` marks a GraphQL fragment (no key of its own)
//! - `flatten name: Ty` - embedded: the field's own fields are matched
//!   directly against the parent object's keys
//!
//! ```
//! use graphql_json::graphql_record;
//!
//! graphql_record! {
//!     #[derive(Default, Debug)]
//!     pub struct Hero {
//!         pub name: String,
//!         "friends(first: 10)" pub friends: Vec<Hero>,
//!     }
//! }
//! ```

/// Declare a struct and register it as a decodable GraphQL record.
///
/// Fields are plain (`name: Ty`), tagged (`"tag" name: Ty`, with `...` tags
/// marking fragments), or embedded (`flatten name: Ty`).
#[macro_export]
macro_rules! graphql_record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $($body:tt)*
        }
    ) => {
        $crate::graphql_record!(@munch
            [ $(#[$meta])* ] [ $vis ] [ $name ]
            fields = [ ]
            rest = [ $($body)* ]
        );
    };

    // All fields consumed: emit the struct and its impls.
    (@munch
        [ $(#[$meta:meta])* ] [ $vis:vis ] [ $name:ident ]
        fields = [ $( { $tag:expr, $embedded:expr, $fvis:vis $fname:ident : $fty:ty } )* ]
        rest = [ ]
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $( $fvis $fname : $fty, )*
        }

        impl $crate::Record for $name {
            fn fields(&self) -> &'static [$crate::FieldDescriptor] {
                const FIELDS: &[$crate::FieldDescriptor] = &[
                    $( $crate::FieldDescriptor::new(stringify!($fname), $tag, $embedded), )*
                ];
                FIELDS
            }

            fn slot_at(&mut self, index: usize) -> $crate::Slot<'_> {
                #[allow(unused_mut, unused_variables)]
                let mut current = 0usize;
                $(
                    if index == current {
                        return $crate::Target::slot(&mut self.$fname);
                    }
                    #[allow(unused_assignments)]
                    {
                        current += 1;
                    }
                )*
                unreachable!("field index {index} out of range for {}", stringify!($name))
            }
        }

        impl $crate::Target for $name {
            fn slot(&mut self) -> $crate::Slot<'_> {
                $crate::Slot::Record(self)
            }
        }
    };

    // Embedded field: `flatten name: Ty`
    (@munch
        [ $(#[$meta:meta])* ] [ $vis:vis ] [ $name:ident ]
        fields = [ $($acc:tt)* ]
        rest = [ flatten $fvis:vis $fname:ident : $fty:ty $(, $($rest:tt)*)? ]
    ) => {
        $crate::graphql_record!(@munch
            [ $(#[$meta])* ] [ $vis ] [ $name ]
            fields = [ $($acc)* { ::core::option::Option::None, true, $fvis $fname : $fty } ]
            rest = [ $($($rest)*)? ]
        );
    };

    // Tagged field: `"tag" name: Ty`
    (@munch
        [ $(#[$meta:meta])* ] [ $vis:vis ] [ $name:ident ]
        fields = [ $($acc:tt)* ]
        rest = [ $tag:literal $fvis:vis $fname:ident : $fty:ty $(, $($rest:tt)*)? ]
    ) => {
        $crate::graphql_record!(@munch
            [ $(#[$meta])* ] [ $vis ] [ $name ]
            fields = [ $($acc)* { ::core::option::Option::Some($tag), false, $fvis $fname : $fty } ]
            rest = [ $($($rest)*)? ]
        );
    };

    // Plain field: `name: Ty`
    (@munch
        [ $(#[$meta:meta])* ] [ $vis:vis ] [ $name:ident ]
        fields = [ $($acc:tt)* ]
        rest = [ $fvis:vis $fname:ident : $fty:ty $(, $($rest:tt)*)? ]
    ) => {
        $crate::graphql_record!(@munch
            [ $(#[$meta])* ] [ $vis ] [ $name ]
            fields = [ $($acc)* { ::core::option::Option::None, false, $fvis $fname : $fty } ]
            rest = [ $($($rest)*)? ]
        );
    };
}
