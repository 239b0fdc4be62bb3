//! Member collection across the ancestry chain.

use reflectgrid_core::{MemberDescriptor, Reflect};

/// Collect every annotated member of `target` and its ancestors.
///
/// The most-derived type comes first. Within a type, fields precede actions and each group keeps
/// declaration order. Every descriptor is stamped with the ancestry depth that declares it.
pub fn collect_members(target: &dyn Reflect) -> Vec<MemberDescriptor> {
    let mut members = Vec::new();
    let mut current = Some(target);
    let mut depth = 0;
    while let Some(object) = current {
        let (fields, actions): (Vec<_>, Vec<_>) = object
            .declared_members()
            .into_iter()
            .map(|member| member.at_depth(depth))
            .partition(MemberDescriptor::is_field);
        members.extend(fields);
        members.extend(actions);
        current = object.parent();
        depth += 1;
    }
    members
}

#[cfg(test)]
mod tests {
    use reflectgrid_core::{ActionAnnotation, FieldAnnotation, FieldType, ReflectError, Value};

    use super::*;

    struct Base;
    struct Derived {
        base: Base,
    }

    impl Reflect for Base {
        fn type_name(&self) -> &'static str {
            "Base"
        }

        fn declared_members(&self) -> Vec<MemberDescriptor> {
            vec![
                MemberDescriptor::action("Base", "reset", ActionAnnotation::DEFAULT),
                MemberDescriptor::field("Base", "id", FieldType::Text, FieldAnnotation::DEFAULT),
            ]
        }

        fn field(&self, name: &str) -> Result<Value, ReflectError> {
            Err(ReflectError::no_such_field("Base", name))
        }

        fn set_field(&mut self, name: &str, _: Value) -> Result<(), ReflectError> {
            Err(ReflectError::no_such_field("Base", name))
        }
    }

    impl Reflect for Derived {
        fn type_name(&self) -> &'static str {
            "Derived"
        }

        fn declared_members(&self) -> Vec<MemberDescriptor> {
            vec![
                MemberDescriptor::field("Derived", "name", FieldType::Text, FieldAnnotation::DEFAULT),
                MemberDescriptor::field("Derived", "active", FieldType::Bool, FieldAnnotation::DEFAULT),
            ]
        }

        fn field(&self, name: &str) -> Result<Value, ReflectError> {
            Err(ReflectError::no_such_field("Derived", name))
        }

        fn set_field(&mut self, name: &str, _: Value) -> Result<(), ReflectError> {
            Err(ReflectError::no_such_field("Derived", name))
        }

        fn parent(&self) -> Option<&dyn Reflect> {
            Some(&self.base)
        }

        fn parent_mut(&mut self) -> Option<&mut dyn Reflect> {
            Some(&mut self.base)
        }
    }

    #[test]
    fn test_most_derived_first_fields_before_actions() {
        let members = collect_members(&Derived { base: Base });
        let names: Vec<_> = members.iter().map(|m| (m.name, m.depth)).collect();
        assert_eq!(names, [("name", 0), ("active", 0), ("id", 1), ("reset", 1)]);
    }
}
