//! The `xml_model!` declaration macro.

/// Declares a model struct, its field table, and one accessor per field.
///
/// Each field line names its kind, the accessor, and the backing attribute
/// or tag. Attribute and element fields take an optional validator.
///
/// ```
/// use lazy_xml_model::prelude::*;
///
/// fn year(value: &str) -> Result<(), String> {
///     value.parse::<u16>().map(|_| ()).map_err(|e| e.to_string())
/// }
///
/// xml_model! {
///     /// A company.
///     pub struct Company as "company" {
///         attribute name = "name";
///         attribute founding_year = "foundingyear", validate = year;
///         element motto = "motto";
///         has_one description: Description = "description";
///         has_many locations: Location = "location";
///     }
/// }
///
/// xml_model! {
///     /// What a company says about itself.
///     pub struct Description {
///         attribute kind = "type";
///     }
/// }
///
/// xml_model! {
///     /// An office.
///     pub struct Location {
///         attribute city = "city";
///     }
/// }
///
/// let company = Company::new();
/// company.name().set("SUSE").unwrap();
/// assert!(company.founding_year().set("soon").is_err());
/// company.locations().build([("city", "Nuremberg")]).unwrap();
/// assert_eq!(Description::new().to_xml(), "<description/>");
/// assert_eq!(
///     company.to_xml(),
///     "<company name=\"SUSE\">\n  <location city=\"Nuremberg\"/>\n</company>"
/// );
/// ```
#[macro_export]
macro_rules! xml_model {
    (@kind attribute) => { $crate::model::FieldKind::Attribute };
    (@kind element) => { $crate::model::FieldKind::Element };
    (@kind has_one) => { $crate::model::FieldKind::SingleChild };
    (@kind has_many) => { $crate::model::FieldKind::RepeatedChild };

    (@root_tag) => { ::core::option::Option::None };
    (@root_tag $tag:literal) => {{
        ::core::assert!($crate::tree::is_valid_name($tag), "root tag is not a valid XML name");
        ::core::option::Option::Some($tag)
    }};

    (@decl $kind:ident $field:ident : $ty:ty = $backing:literal) => {
        $crate::model::FieldDecl::new(
            ::core::stringify!($field),
            $crate::xml_model!(@kind $kind),
            $backing,
        )
        .with_children(<$ty as $crate::model::ProxyBacked>::declared_fields)
    };
    (@decl $kind:ident $field:ident = $backing:literal $(, $validator:path)?) => {
        $crate::model::FieldDecl::new(
            ::core::stringify!($field),
            $crate::xml_model!(@kind $kind),
            $backing,
        )
        $(.with_validator($validator))?
    };

    (@accessor attribute $field:ident = $backing:literal $(, $validator:path)?) => {
        #[doc = ::core::concat!("The `", $backing, "` attribute.")]
        pub fn $field(&self) -> $crate::model::AttributeField<'_> {
            static DECL: $crate::model::FieldDecl =
                $crate::xml_model!(@decl attribute $field = $backing $(, $validator)?);
            $crate::model::AttributeField::new(&self.proxy, &DECL)
        }
    };
    (@accessor element $field:ident = $backing:literal $(, $validator:path)?) => {
        #[doc = ::core::concat!("The text of the `<", $backing, ">` child element.")]
        pub fn $field(&self) -> $crate::model::ElementField<'_> {
            static DECL: $crate::model::FieldDecl =
                $crate::xml_model!(@decl element $field = $backing $(, $validator)?);
            $crate::model::ElementField::new(&self.proxy, &DECL)
        }
    };
    (@accessor has_one $field:ident : $ty:ty = $backing:literal) => {
        #[doc = ::core::concat!("The `<", $backing, ">` child object.")]
        pub fn $field(&self) -> $crate::model::SingleChildField<'_, $ty> {
            static DECL: $crate::model::FieldDecl =
                $crate::xml_model!(@decl has_one $field: $ty = $backing);
            $crate::model::SingleChildField::new(&self.proxy, &DECL)
        }
    };
    (@accessor has_many $field:ident : $ty:ty = $backing:literal) => {
        #[doc = ::core::concat!("The `<", $backing, ">` child objects.")]
        pub fn $field(&self) -> $crate::model::RepeatedChildField<'_, $ty> {
            static DECL: $crate::model::FieldDecl =
                $crate::xml_model!(@decl has_many $field: $ty = $backing);
            $crate::model::RepeatedChildField::new(&self.proxy, &DECL)
        }
    };

    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident $(as $tag:literal)? {
            $(
                $kind:ident $field:ident $(: $ty:ty)? = $backing:literal
                $(, validate = $validator:path)?;
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        $vis struct $name {
            proxy: $crate::model::ObjectProxy,
        }

        impl $crate::model::ProxyBacked for $name {
            fn from_proxy(proxy: $crate::model::ObjectProxy) -> Self {
                Self { proxy }
            }

            fn proxy(&self) -> &$crate::model::ObjectProxy {
                &self.proxy
            }

            fn declared_fields() -> &'static [$crate::model::FieldDecl] {
                <Self as $crate::model::XmlModel>::FIELDS
            }
        }

        impl $crate::model::XmlModel for $name {
            const TYPE_NAME: &'static str = ::core::stringify!($name);
            const ROOT_TAG: ::core::option::Option<&'static str> =
                $crate::xml_model!(@root_tag $($tag)?);
            const FIELDS: &'static [$crate::model::FieldDecl] = &[
                $( $crate::xml_model!(@decl $kind $field $(: $ty)? = $backing $(, $validator)?), )*
            ];
        }

        impl $name {
            $( $crate::xml_model!(@accessor $kind $field $(: $ty)? = $backing $(, $validator)?); )*
        }
    };
}
