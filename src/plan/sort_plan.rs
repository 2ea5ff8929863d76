//! Sorts a plan's output (spec.md §4.13): splits the input into sorted
//! runs, merges pairwise until at most two remain, and exposes the result
//! as a `SortScan`. Cost is estimated as if the whole input were
//! materialized once.

use std::cmp::Ordering;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::error::Result;
use crate::query::{SortField, SortScan};
use crate::record::{Layout, Schema, TableScan};
use crate::scan::{Scan, UpdateScan};
use crate::tx::TxHandle;

use super::materialize_plan::next_temp_table_name;
use super::Plan;

pub struct SortPlan {
    input: Box<dyn Plan>,
    tx: TxHandle,
    schema: Schema,
    sort_fields: Rc<Vec<SortField>>,
}

impl SortPlan {
    pub fn new(input: Box<dyn Plan>, sort_fields: Vec<SortField>, tx: TxHandle) -> Self {
        let schema = input.schema().clone();
        Self {
            input,
            tx,
            schema,
            sort_fields: Rc::new(sort_fields),
        }
    }

    fn new_temp_table(&self) -> Result<TableScan> {
        let layout = Rc::new(Layout::from_schema(self.schema.clone()));
        TableScan::new(self.tx.clone(), &next_temp_table_name(), layout)
    }

    fn compare(&self, s1: &mut dyn Scan, s2: &mut dyn Scan) -> Result<Ordering> {
        for sf in self.sort_fields.iter() {
            let a = s1.get_val(&sf.field)?;
            let b = s2.get_val(&sf.field)?;
            let ord = a.partial_cmp(&b).unwrap_or(Ordering::Equal);
            let ord = if sf.desc { ord.reverse() } else { ord };
            if ord != Ordering::Equal {
                return Ok(ord);
            }
        }
        Ok(Ordering::Equal)
    }

    fn copy(&self, src: &mut dyn Scan, dest: &mut TableScan) -> Result<bool> {
        dest.insert()?;
        for field in self.schema.fields() {
            dest.set_val(field, src.get_val(field)?)?;
        }
        src.next()
    }

    fn split_into_runs(&self) -> Result<Vec<TableScan>> {
        let mut runs = Vec::new();
        let mut src = self.input.open()?;
        src.before_first()?;
        if !src.next()? {
            return Ok(runs);
        }
        let mut current = self.new_temp_table()?;
        let mut has_more = self.copy(src.as_mut(), &mut current)?;
        loop {
            if !has_more {
                break;
            }
            if self.compare(src.as_mut(), &mut current)? == Ordering::Less {
                runs.push(current);
                current = self.new_temp_table()?;
            }
            has_more = self.copy(src.as_mut(), &mut current)?;
        }
        runs.push(current);
        Ok(runs)
    }

    fn merge_two_runs(&self, mut s1: TableScan, mut s2: TableScan) -> Result<TableScan> {
        s1.before_first()?;
        s2.before_first()?;
        let mut dest = self.new_temp_table()?;
        let mut has_more1 = s1.next()?;
        let mut has_more2 = s2.next()?;
        while has_more1 && has_more2 {
            if self.compare(&mut s1, &mut s2)? != Ordering::Greater {
                has_more1 = self.copy(&mut s1, &mut dest)?;
            } else {
                has_more2 = self.copy(&mut s2, &mut dest)?;
            }
        }
        if has_more1 {
            while has_more1 {
                has_more1 = self.copy(&mut s1, &mut dest)?;
            }
        } else {
            while has_more2 {
                has_more2 = self.copy(&mut s2, &mut dest)?;
            }
        }
        Ok(dest)
    }

    fn merge_all_runs(&self, runs: Vec<TableScan>) -> Result<Vec<TableScan>> {
        let mut runs: VecDeque<TableScan> = runs.into();
        while runs.len() > 2 {
            let mut new_runs = VecDeque::new();
            while runs.len() > 1 {
                let p1 = runs.pop_front().unwrap();
                let p2 = runs.pop_front().unwrap();
                new_runs.push_back(self.merge_two_runs(p1, p2)?);
            }
            if let Some(remaining) = runs.pop_front() {
                new_runs.push_back(remaining);
            }
            runs = new_runs;
        }
        Ok(runs.into())
    }
}

impl Plan for SortPlan {
    fn open(&self) -> Result<Box<dyn Scan>> {
        let mut runs = self.split_into_runs()?;
        if runs.is_empty() {
            runs.push(self.new_temp_table()?);
        }
        let mut runs = self.merge_all_runs(runs)?;
        let s1 = runs.remove(0);
        let s2 = if runs.is_empty() { None } else { Some(runs.remove(0)) };
        Ok(Box::new(SortScan::new(s1, s2, self.sort_fields.clone())?))
    }

    fn blocks_accessed(&self) -> u64 {
        let layout = Layout::from_schema(self.schema.clone());
        let rpb = (self.tx.borrow().block_size() / layout.slot_size().max(1)).max(1) as u64;
        let records = self.input.records_output();
        (records + rpb - 1) / rpb
    }

    fn records_output(&self) -> u64 {
        self.input.records_output()
    }

    fn distinct_values(&self, field: &str) -> u64 {
        self.input.distinct_values(field)
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }
}
