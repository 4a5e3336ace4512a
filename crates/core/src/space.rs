use std::collections::BTreeMap;

use tracing::debug;

use crate::catalog::{Catalog, GroupIx, LessonIx, SlotIx, TeacherIx};
use crate::error::EngineError;

/// Column of a boolean `x[lesson, slot]` decision variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub u32);

impl VarId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Decision variables for every structurally possible (lesson, slot) pair.
#[derive(Clone, Debug)]
pub struct VarSpace {
    vars: Vec<(LessonIx, SlotIx)>,
    lookup: Vec<Option<VarId>>,
    slot_count: usize,
    by_group_slot: Vec<Vec<VarId>>,
    by_teacher_slot: Vec<Vec<VarId>>,
    domain_by_group: BTreeMap<String, usize>,
}

impl VarSpace {
    pub fn build(catalog: &Catalog) -> Result<Self, EngineError> {
        let slot_count = catalog.slot_count();
        let mut vars = Vec::new();
        let mut lookup = vec![None; catalog.lessons.len() * slot_count];
        let mut by_group_slot = vec![Vec::new(); catalog.groups.len() * slot_count];

        for l in catalog.lesson_ids() {
            let lesson = catalog.lesson(l);
            let mut available = 0usize;
            for s in catalog.slot_ids() {
                if catalog.is_excluded(lesson.group, s) {
                    continue;
                }
                let id = VarId(vars.len() as u32);
                vars.push((l, s));
                lookup[l.index() * slot_count + s.index()] = Some(id);
                by_group_slot[lesson.group.index() * slot_count + s.index()].push(id);
                available += 1;
            }
            if available < lesson.hours as usize {
                return Err(EngineError::InsufficientDomain {
                    lesson: catalog.lesson_ref(l),
                    required: lesson.hours,
                    available,
                });
            }
        }

        let mut space = VarSpace {
            vars,
            lookup,
            slot_count,
            by_group_slot,
            by_teacher_slot: Vec::new(),
            domain_by_group: BTreeMap::new(),
        };

        // one representative lesson per sync unit, so co-taught joint members count once
        let mut by_teacher_slot = vec![Vec::new(); catalog.teachers.len() * slot_count];
        for (t, units) in catalog.teacher_units.iter().enumerate() {
            for s in catalog.slot_ids() {
                let cell = &mut by_teacher_slot[t * slot_count + s.index()];
                for unit in units {
                    if let Some(v) = unit.iter().find_map(|&l| space.var(l, s)) {
                        cell.push(v);
                    }
                }
            }
        }
        space.by_teacher_slot = by_teacher_slot;

        for (g, group) in catalog.groups.iter().enumerate() {
            let open = group.excluded.iter().filter(|&&e| !e).count();
            space.domain_by_group.insert(group.name.0.clone(), open);
            debug!(group = %group.name, g, open, "class domain");
        }
        debug!(vars = space.len(), "variable space built");
        Ok(space)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn var(&self, lesson: LessonIx, slot: SlotIx) -> Option<VarId> {
        self.lookup
            .get(lesson.index() * self.slot_count + slot.index())
            .copied()
            .flatten()
    }

    pub fn key(&self, v: VarId) -> (LessonIx, SlotIx) {
        self.vars[v.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (VarId, LessonIx, SlotIx)> + '_ {
        self.vars
            .iter()
            .enumerate()
            .map(|(i, &(l, s))| (VarId(i as u32), l, s))
    }

    /// Variables of one lesson, in slot order.
    pub fn of_lesson(&self, lesson: LessonIx) -> impl Iterator<Item = (SlotIx, VarId)> + '_ {
        let base = lesson.index() * self.slot_count;
        self.lookup[base..base + self.slot_count]
            .iter()
            .enumerate()
            .filter_map(|(s, v)| v.map(|v| (SlotIx(s as u32), v)))
    }

    pub fn at_group(&self, group: GroupIx, slot: SlotIx) -> &[VarId] {
        &self.by_group_slot[group.index() * self.slot_count + slot.index()]
    }

    pub fn at_teacher(&self, teacher: TeacherIx, slot: SlotIx) -> &[VarId] {
        &self.by_teacher_slot[teacher.index() * self.slot_count + slot.index()]
    }

    pub fn domain_by_group(&self) -> &BTreeMap<String, usize> {
        &self.domain_by_group
    }
}
