use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, NaiveTime};
use color_eyre::eyre::WrapErr;
use color_eyre::Result;

use super::db::NotesDb;
use super::note::{date_key, sort_notes, Note, NoteUpdate};

/// In-memory view of the notes loaded so far, written through to the database.
///
/// Each cached date holds the complete, ordered list of that day's notes.
/// `index` maps every cached note id to the date it is filed under.
pub struct NotesStore {
    db: NotesDb,
    notes: BTreeMap<NaiveDate, Vec<Note>>,
    index: HashMap<i64, NaiveDate>,
}

impl NotesStore {
    pub fn new(db: NotesDb) -> Self {
        Self {
            db,
            notes: BTreeMap::new(),
            index: HashMap::new(),
        }
    }

    pub fn notes(&self, date: NaiveDate) -> &[Note] {
        self.notes.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn note(&self, id: i64) -> Option<&Note> {
        let date = self.index.get(&id)?;
        self.notes.get(date)?.iter().find(|n| n.id == id)
    }

    pub fn is_loaded(&self, date: NaiveDate) -> bool {
        self.notes.contains_key(&date)
    }

    /// Load a day's notes from the database, replacing whatever was cached.
    pub fn fetch_notes(&mut self, date: NaiveDate) -> Result<&[Note]> {
        let notes = self
            .db
            .select_by_date(date)
            .wrap_err_with(|| format!("Failed to load notes for {}", date_key(date)))?;
        log::debug!("Fetched {} notes for {}", notes.len(), date_key(date));
        self.replace_day(date, notes);
        Ok(self.notes(date))
    }

    /// Load every day in `start..=end` with a single query. Days without notes
    /// get an empty entry.
    pub fn fetch_range(&mut self, start: NaiveDate, end: NaiveDate) -> Result<()> {
        let (start, end) = if start <= end { (start, end) } else { (end, start) };

        let rows = self.db.select_range(start, end).wrap_err_with(|| {
            format!("Failed to load notes for {}..{}", date_key(start), date_key(end))
        })?;
        log::debug!(
            "Fetched {} notes for {}..{}",
            rows.len(),
            date_key(start),
            date_key(end)
        );

        let mut by_date: BTreeMap<NaiveDate, Vec<Note>> = BTreeMap::new();
        for note in rows {
            by_date.entry(note.date).or_default().push(note);
        }

        for date in start.iter_days().take_while(|d| *d <= end) {
            let notes = by_date.remove(&date).unwrap_or_default();
            self.replace_day(date, notes);
        }
        Ok(())
    }

    pub fn ensure_loaded(&mut self, date: NaiveDate) -> Result<()> {
        if !self.is_loaded(date) {
            self.fetch_notes(date)?;
        }
        Ok(())
    }

    /// Create a note. A blank description is ignored and yields `Ok(None)`.
    pub fn add_note(
        &mut self,
        date: NaiveDate,
        time: Option<NaiveTime>,
        description: &str,
        order_index: i64,
    ) -> Result<Option<Note>> {
        let description = description.trim();
        if description.is_empty() {
            log::debug!("Ignoring note with empty description for {}", date_key(date));
            return Ok(None);
        }

        let id = self
            .db
            .insert(date, time, description, order_index)
            .wrap_err("Failed to save note")?;
        let note = Note {
            id,
            date,
            time,
            description: description.to_string(),
            order_index,
        };
        log::info!("Added note {} on {}", id, date_key(date));

        match self.notes.get_mut(&date) {
            Some(list) => {
                // Newest id sorts first among equal order_index, so with the
                // default index this is a prepend.
                let position = list
                    .iter()
                    .position(|n| n.order_index >= order_index)
                    .unwrap_or(list.len());
                list.insert(position, note.clone());
                self.index.insert(id, date);
            }
            None => {
                self.fetch_notes(date)?;
            }
        }

        Ok(Some(note))
    }

    /// Persist the supplied fields and merge them into the cached copy.
    /// Returns `false` when nothing was written: blank description, empty
    /// update or unknown id.
    pub fn update_note(&mut self, id: i64, mut update: NoteUpdate) -> Result<bool> {
        if let Some(description) = update.description.take() {
            let trimmed = description.trim();
            if trimmed.is_empty() {
                log::debug!("Ignoring update of note {} with empty description", id);
                return Ok(false);
            }
            update.description = Some(trimmed.to_string());
        }
        if update.is_empty() {
            return Ok(false);
        }

        let rows = self
            .db
            .update(id, &update)
            .wrap_err_with(|| format!("Failed to update note {}", id))?;
        if rows == 0 {
            log::warn!("Update of unknown note {}", id);
            return Ok(false);
        }
        log::info!("Updated note {}", id);

        if let Some(date) = self.index.get(&id).copied() {
            if let Some(list) = self.notes.get_mut(&date) {
                if let Some(note) = list.iter_mut().find(|n| n.id == id) {
                    note.apply(&update);
                }
                if update.order_index.is_some() {
                    sort_notes(list);
                }
            }
        }

        Ok(true)
    }

    /// Remove a note from the database and from every cached day.
    pub fn delete_note(&mut self, id: i64) -> Result<bool> {
        let rows = self
            .db
            .delete(id)
            .wrap_err_with(|| format!("Failed to delete note {}", id))?;

        if let Some(date) = self.index.remove(&id) {
            if let Some(list) = self.notes.get_mut(&date) {
                list.retain(|n| n.id != id);
            }
        }

        if rows > 0 {
            log::info!("Deleted note {}", id);
        }
        Ok(rows > 0)
    }

    /// Refile a note under another date. The cached source list loses the note
    /// and a cached destination list gains it in the same call.
    pub fn move_note_to_date(&mut self, id: i64, new_date: NaiveDate) -> Result<bool> {
        let rows = self
            .db
            .update_date(id, new_date)
            .wrap_err_with(|| format!("Failed to move note {} to {}", id, date_key(new_date)))?;
        if rows == 0 {
            log::warn!("Move of unknown note {}", id);
            return Ok(false);
        }

        let cached = self.take_cached(id);

        if self.notes.contains_key(&new_date) {
            let note = match cached {
                Some(note) => Some(note),
                None => self
                    .db
                    .select_by_id(id)
                    .wrap_err_with(|| format!("Failed to reload note {}", id))?,
            };
            if let Some(mut note) = note {
                note.date = new_date;
                if let Some(list) = self.notes.get_mut(&new_date) {
                    list.push(note);
                    sort_notes(list);
                }
                self.index.insert(id, new_date);
            }
        }

        log::info!("Moved note {} to {}", id, date_key(new_date));
        Ok(true)
    }

    /// Shift a note `offset` places within its day. Every note of that day is
    /// renumbered to its new position.
    pub fn reorder_note(&mut self, id: i64, offset: isize) -> Result<bool> {
        let Some(date) = self.index.get(&id).copied() else {
            return Ok(false);
        };
        let Some(list) = self.notes.get_mut(&date) else {
            return Ok(false);
        };
        let Some(from) = list.iter().position(|n| n.id == id) else {
            return Ok(false);
        };

        let last = list.len() as isize - 1;
        let to = (from as isize + offset).clamp(0, last) as usize;
        if to == from {
            return Ok(false);
        }

        let mut reordered = list.clone();
        let note = reordered.remove(from);
        reordered.insert(to, note);

        let ids: Vec<i64> = reordered.iter().map(|n| n.id).collect();
        self.db
            .reorder(&ids)
            .wrap_err_with(|| format!("Failed to reorder notes on {}", date_key(date)))?;

        for (position, note) in reordered.iter_mut().enumerate() {
            note.order_index = position as i64;
        }
        *list = reordered;

        log::info!("Moved note {} from position {} to {}", id, from, to);
        Ok(true)
    }

    fn replace_day(&mut self, date: NaiveDate, notes: Vec<Note>) {
        if let Some(old) = self.notes.get(&date) {
            for note in old {
                if self.index.get(&note.id) == Some(&date) {
                    self.index.remove(&note.id);
                }
            }
        }

        // A note fetched here may still sit in another cached day if it was
        // moved behind our back; drop the stale copy.
        for note in &notes {
            if let Some(previous) = self.index.insert(note.id, date) {
                if previous != date {
                    if let Some(list) = self.notes.get_mut(&previous) {
                        list.retain(|n| n.id != note.id);
                    }
                }
            }
        }

        self.notes.insert(date, notes);
    }

    fn take_cached(&mut self, id: i64) -> Option<Note> {
        let date = self.index.remove(&id)?;
        let list = self.notes.get_mut(&date)?;
        let position = list.iter().position(|n| n.id == id)?;
        Some(list.remove(position))
    }
}
