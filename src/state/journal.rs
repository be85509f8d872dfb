//! Entity-level edit log recorded while a command runs.
//!
//! Every mutation a command makes goes through [`Tx`], which applies it to the
//! working model and records it. Reverting the recorded edits in reverse order
//! restores the exact prior model (values, list membership and positions);
//! replaying them forward reproduces the exact result, including generated ids
//! and timestamps.

use crate::state::data_model::{
    BodyCell, BodyRow, Column, FilterRule, FooterCell, HeaderCell, TableModel,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListEdit<T> {
    Insert { index: usize, value: T },
    Remove { index: usize, value: T },
    Replace { index: usize, before: T, after: T },
}

impl<T: Clone> ListEdit<T> {
    fn apply(&self, items: &mut Vec<T>) {
        match self {
            Self::Insert { index, value } => items.insert(*index, value.clone()),
            Self::Remove { index, .. } => {
                items.remove(*index);
            }
            Self::Replace { index, after, .. } => items[*index] = after.clone(),
        }
    }

    fn revert(&self, items: &mut Vec<T>) {
        match self {
            Self::Insert { index, .. } => {
                items.remove(*index);
            }
            Self::Remove { index, value } => items.insert(*index, value.clone()),
            Self::Replace { index, before, .. } => items[*index] = before.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Edit {
    Column(ListEdit<Column>),
    BodyRow(ListEdit<BodyRow>),
    HeaderCell(ListEdit<HeaderCell>),
    BodyCell(ListEdit<BodyCell>),
    FooterCell(ListEdit<FooterCell>),
    FilterRule(ListEdit<FilterRule>),
}

/// Entity collections that commands may change.
pub trait Tracked: Clone + PartialEq + Sized {
    fn list(model: &mut TableModel) -> &mut Vec<Self>;
    fn wrap(edit: ListEdit<Self>) -> Edit;
}

impl Tracked for Column {
    fn list(model: &mut TableModel) -> &mut Vec<Self> {
        &mut model.columns
    }
    fn wrap(edit: ListEdit<Self>) -> Edit {
        Edit::Column(edit)
    }
}

impl Tracked for BodyRow {
    fn list(model: &mut TableModel) -> &mut Vec<Self> {
        &mut model.body_rows
    }
    fn wrap(edit: ListEdit<Self>) -> Edit {
        Edit::BodyRow(edit)
    }
}

impl Tracked for HeaderCell {
    fn list(model: &mut TableModel) -> &mut Vec<Self> {
        &mut model.header_cells
    }
    fn wrap(edit: ListEdit<Self>) -> Edit {
        Edit::HeaderCell(edit)
    }
}

impl Tracked for BodyCell {
    fn list(model: &mut TableModel) -> &mut Vec<Self> {
        &mut model.body_cells
    }
    fn wrap(edit: ListEdit<Self>) -> Edit {
        Edit::BodyCell(edit)
    }
}

impl Tracked for FooterCell {
    fn list(model: &mut TableModel) -> &mut Vec<Self> {
        &mut model.footer_cells
    }
    fn wrap(edit: ListEdit<Self>) -> Edit {
        Edit::FooterCell(edit)
    }
}

impl Tracked for FilterRule {
    fn list(model: &mut TableModel) -> &mut Vec<Self> {
        &mut model.filter_rules
    }
    fn wrap(edit: ListEdit<Self>) -> Edit {
        Edit::FilterRule(edit)
    }
}

impl Edit {
    fn apply(&self, model: &mut TableModel) {
        match self {
            Self::Column(edit) => edit.apply(&mut model.columns),
            Self::BodyRow(edit) => edit.apply(&mut model.body_rows),
            Self::HeaderCell(edit) => edit.apply(&mut model.header_cells),
            Self::BodyCell(edit) => edit.apply(&mut model.body_cells),
            Self::FooterCell(edit) => edit.apply(&mut model.footer_cells),
            Self::FilterRule(edit) => edit.apply(&mut model.filter_rules),
        }
    }

    fn revert(&self, model: &mut TableModel) {
        match self {
            Self::Column(edit) => edit.revert(&mut model.columns),
            Self::BodyRow(edit) => edit.revert(&mut model.body_rows),
            Self::HeaderCell(edit) => edit.revert(&mut model.header_cells),
            Self::BodyCell(edit) => edit.revert(&mut model.body_cells),
            Self::FooterCell(edit) => edit.revert(&mut model.footer_cells),
            Self::FilterRule(edit) => edit.revert(&mut model.filter_rules),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Journal {
    edits: Vec<Edit>,
}

impl Journal {
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn edits(&self) -> &[Edit] {
        &self.edits
    }

    /// Replays the edits on the model they were recorded against.
    pub fn apply(&self, model: &mut TableModel) {
        for edit in &self.edits {
            edit.apply(model);
        }
    }

    /// Restores the model that existed before the edits were recorded.
    pub fn revert(&self, model: &mut TableModel) {
        for edit in self.edits.iter().rev() {
            edit.revert(model);
        }
    }
}

/// Recording handle over a working copy of the model.
pub struct Tx<'a> {
    model: &'a mut TableModel,
    journal: Journal,
}

impl<'a> Tx<'a> {
    pub fn new(model: &'a mut TableModel) -> Self {
        Self {
            model,
            journal: Journal::default(),
        }
    }

    pub fn model(&self) -> &TableModel {
        &*self.model
    }

    pub fn finish(self) -> Journal {
        self.journal
    }

    pub fn insert<T: Tracked>(&mut self, index: usize, value: T) {
        let edit = ListEdit::Insert { index, value };
        edit.apply(T::list(self.model));
        self.journal.edits.push(T::wrap(edit));
    }

    pub fn push<T: Tracked>(&mut self, value: T) {
        let index = T::list(self.model).len();
        self.insert(index, value);
    }

    pub fn remove<T: Tracked>(&mut self, index: usize) -> T {
        let value = T::list(self.model).remove(index);
        self.journal.edits.push(T::wrap(ListEdit::Remove {
            index,
            value: value.clone(),
        }));
        value
    }

    /// Removes every entity matching `pred`, last first so recorded indices
    /// stay valid during revert.
    pub fn remove_where<T: Tracked>(&mut self, pred: impl Fn(&T) -> bool) -> Vec<T> {
        let indices: Vec<usize> = T::list(self.model)
            .iter()
            .enumerate()
            .filter_map(|(idx, item)| pred(item).then_some(idx))
            .collect();
        let mut removed: Vec<T> = indices.into_iter().rev().map(|idx| self.remove(idx)).collect();
        removed.reverse();
        removed
    }

    /// Applies `f` to the entity at `index`; records nothing when it is unchanged.
    pub fn update<T: Tracked>(&mut self, index: usize, f: impl FnOnce(&mut T)) {
        let before = T::list(self.model)[index].clone();
        let mut after = before.clone();
        f(&mut after);
        if after == before {
            return;
        }
        let edit = ListEdit::Replace { index, before, after };
        edit.apply(T::list(self.model));
        self.journal.edits.push(T::wrap(edit));
    }

    pub fn update_where<T: Tracked>(&mut self, pred: impl Fn(&T) -> bool, f: impl Fn(&mut T)) {
        let indices: Vec<usize> = T::list(self.model)
            .iter()
            .enumerate()
            .filter_map(|(idx, item)| pred(item).then_some(idx))
            .collect();
        for idx in indices {
            self.update(idx, &f);
        }
    }
}
