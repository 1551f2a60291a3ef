use crate::model::{MemberSetExpr, ParticipantGroup};
use fxhash::FxHashMap;
use std::borrow::Cow;

/// Resolves group names to participant groups
#[derive(Default)]
pub struct MemberSetResolver<'a> {
    groups: FxHashMap<&'a str, ParticipantGroup>,
}

impl<'a> MemberSetResolver<'a> {
    pub fn new() -> Self {
        Self {
            groups: FxHashMap::default(),
        }
    }

    pub fn evaluate_and_register_group(
        &mut self,
        name: &'a str,
        expr: &MemberSetExpr<'a>,
    ) -> Option<ParticipantGroup> {
        let members = self.evaluate_members(expr)?;
        self.register_group(name, members.clone());
        Some(members)
    }

    pub fn register_group(&mut self, name: &'a str, members: ParticipantGroup) {
        self.groups.insert(name, members);
    }

    pub fn evaluate_members(&self, expr: &MemberSetExpr<'a>) -> Option<ParticipantGroup> {
        expr.evaluate(&|name| self.groups.get(name))
            .map(Cow::into_owned)
    }

    pub fn is_group_defined(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MemberSetOp, ParticipantId};
    use rstest::{fixture, rstest};

    #[fixture]
    fn resolver() -> MemberSetResolver<'static> {
        let mut resolver = MemberSetResolver::new();
        resolver.register_group(
            "MEMBERS",
            ParticipantGroup::new((0..5).map(ParticipantId)),
        );
        resolver
    }

    #[rstest]
    fn registers_derived_groups(mut resolver: MemberSetResolver<'static>) {
        let crew = MemberSetExpr::new(vec![
            MemberSetOp::PushGroup("MEMBERS"),
            MemberSetOp::Push(ParticipantId(4)),
            MemberSetOp::Difference,
        ]);
        let registered = resolver
            .evaluate_and_register_group("crew", &crew)
            .expect("crew evaluates");
        assert_eq!(registered.len(), 4);
        assert!(resolver.is_group_defined("crew"));

        let without_first = MemberSetExpr::new(vec![
            MemberSetOp::PushGroup("crew"),
            MemberSetOp::Push(ParticipantId(0)),
            MemberSetOp::Difference,
        ]);
        let members = resolver
            .evaluate_members(&without_first)
            .expect("evaluates");
        assert_eq!(
            members.members(),
            &[ParticipantId(1), ParticipantId(2), ParticipantId(3)]
        );
    }

    #[rstest]
    fn undefined_group_is_not_registered(mut resolver: MemberSetResolver<'static>) {
        let expr = MemberSetExpr::new(vec![MemberSetOp::PushGroup("nobody")]);
        assert!(resolver.evaluate_and_register_group("x", &expr).is_none());
        assert!(!resolver.is_group_defined("x"));
        assert!(resolver.is_group_defined("MEMBERS"));
    }
}
