use crate::facade::LibraryFacade;
use crate::models::EntityId;

/// A reversible action on a receiver, the library by default.
pub trait Command<T = LibraryFacade> {
    fn describe(&self) -> String;

    /// Apply the action. `false` when the receiver rejected it.
    fn execute(&mut self, target: &mut T) -> bool;

    /// Revert a previously successful `execute`.
    fn undo(&mut self, target: &mut T) -> bool;
}

/// Adds a book; undo deletes it again.
#[derive(Debug, Clone)]
pub struct AddBookCommand {
    title: String,
    author: String,
    year: i32,
    isbn: String,
    added: Option<EntityId>,
}

impl AddBookCommand {
    pub fn new(title: impl Into<String>, author: impl Into<String>, year: i32, isbn: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            year,
            isbn: isbn.into(),
            added: None,
        }
    }

    /// Id assigned by the last successful execution.
    pub fn added_id(&self) -> Option<EntityId> {
        self.added
    }
}

impl Command for AddBookCommand {
    fn describe(&self) -> String {
        format!("add book '{}'", self.title)
    }

    fn execute(&mut self, facade: &mut LibraryFacade) -> bool {
        let book = facade.add_book(&self.title, &self.author, self.year, &self.isbn);
        self.added = Some(book.id);
        true
    }

    fn undo(&mut self, facade: &mut LibraryFacade) -> bool {
        let removed = self.added.is_some_and(|id| facade.delete_book(id));
        if removed {
            self.added = None;
        }
        removed
    }
}

/// Lends a book; undo returns it.
#[derive(Debug, Clone)]
pub struct BorrowBookCommand {
    reader_id: EntityId,
    book_id: EntityId,
}

impl BorrowBookCommand {
    pub fn new(reader_id: EntityId, book_id: EntityId) -> Self {
        Self { reader_id, book_id }
    }
}

impl Command for BorrowBookCommand {
    fn describe(&self) -> String {
        format!("borrow book {} for reader {}", self.book_id, self.reader_id)
    }

    fn execute(&mut self, facade: &mut LibraryFacade) -> bool {
        facade.borrow_book(self.reader_id, self.book_id)
    }

    fn undo(&mut self, facade: &mut LibraryFacade) -> bool {
        facade.return_book(self.book_id)
    }
}

/// Returns a book; undo lends it back to the same reader.
#[derive(Debug, Clone)]
pub struct ReturnBookCommand {
    book_id: EntityId,
    previous_borrower: Option<EntityId>,
}

impl ReturnBookCommand {
    pub fn new(book_id: EntityId) -> Self {
        Self {
            book_id,
            previous_borrower: None,
        }
    }
}

impl Command for ReturnBookCommand {
    fn describe(&self) -> String {
        format!("return book {}", self.book_id)
    }

    fn execute(&mut self, facade: &mut LibraryFacade) -> bool {
        let borrower = facade.get_book(self.book_id).and_then(|b| b.borrower_id);
        let returned = facade.return_book(self.book_id);
        if returned {
            self.previous_borrower = borrower;
        }
        returned
    }

    fn undo(&mut self, facade: &mut LibraryFacade) -> bool {
        let relent = self
            .previous_borrower
            .is_some_and(|reader_id| facade.borrow_book(reader_id, self.book_id));
        if relent {
            self.previous_borrower = None;
        }
        relent
    }
}

/// Undo/redo stacks of executed commands.
pub struct CommandHistory<T = LibraryFacade> {
    undo_stack: Vec<Box<dyn Command<T>>>,
    redo_stack: Vec<Box<dyn Command<T>>>,
}

impl<T> Default for CommandHistory<T> {
    fn default() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }
}

impl<T> CommandHistory<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a command. It is recorded only if it succeeded.
    pub fn execute(&mut self, target: &mut T, mut command: Box<dyn Command<T>>) -> bool {
        if !command.execute(target) {
            return false;
        }
        self.undo_stack.push(command);
        // A new action invalidates anything that was undone
        self.redo_stack.clear();
        true
    }

    /// Revert the most recent command. Returns its description.
    ///
    /// A command whose undo fails stays on the undo stack.
    pub fn undo_last(&mut self, target: &mut T) -> Option<String> {
        let mut command = self.undo_stack.pop()?;
        if !command.undo(target) {
            tracing::warn!(command = %command.describe(), "undo had no effect");
            self.undo_stack.push(command);
            return None;
        }
        let description = command.describe();
        self.redo_stack.push(command);
        Some(description)
    }

    /// Re-apply the most recently undone command.
    pub fn redo_last(&mut self, target: &mut T) -> Option<String> {
        let mut command = self.redo_stack.pop()?;
        if !command.execute(target) {
            tracing::warn!(command = %command.describe(), "redo was rejected");
            self.redo_stack.push(command);
            return None;
        }
        let description = command.describe();
        self.undo_stack.push(command);
        Some(description)
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }
}

// ─── Light switch ──────────────────────────────────────────

/// A lamp, the receiver of the switch commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Light {
    on: bool,
}

impl Light {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn turn_on(&mut self) {
        self.on = true;
        tracing::info!("light turned on");
    }

    pub fn turn_off(&mut self) {
        self.on = false;
        tracing::info!("light turned off");
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TurnOnLightCommand;

impl Command<Light> for TurnOnLightCommand {
    fn describe(&self) -> String {
        "turn light on".to_string()
    }

    fn execute(&mut self, light: &mut Light) -> bool {
        light.turn_on();
        true
    }

    fn undo(&mut self, light: &mut Light) -> bool {
        light.turn_off();
        true
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TurnOffLightCommand;

impl Command<Light> for TurnOffLightCommand {
    fn describe(&self) -> String {
        "turn light off".to_string()
    }

    fn execute(&mut self, light: &mut Light) -> bool {
        light.turn_off();
        true
    }

    fn undo(&mut self, light: &mut Light) -> bool {
        light.turn_on();
        true
    }
}

/// Slots of assigned commands; the button fires the most recent one.
#[derive(Default)]
pub struct RemoteControl {
    slots: Vec<Box<dyn Command<Light>>>,
}

impl RemoteControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_command(&mut self, command: Box<dyn Command<Light>>) {
        self.slots.push(command);
    }

    /// Execute the most recently assigned command. `false` with no slots.
    pub fn press_button(&mut self, light: &mut Light) -> bool {
        self.slots.last_mut().is_some_and(|command| command.execute(light))
    }

    /// Remove the most recently assigned command and undo it.
    pub fn undo_last(&mut self, light: &mut Light) -> bool {
        self.slots.pop().is_some_and(|mut command| command.undo(light))
    }
}
