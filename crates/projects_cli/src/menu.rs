//! Interactive project menu.
//!
//! # Responsibility
//! - Prompt, parse and print; every data operation goes through the service.
//! - Track the currently selected project between selections.
//!
//! # Invariants
//! - Numeric input is parsed here; malformed numbers never reach the service.
//! - A failed selection prints an error and keeps the loop running.
//! - Blank input or end-of-input at the main prompt exits.

use log::debug;
use projects_core::{
    Decimal2, Material, Project, ProjectId, ProjectRepository, ProjectService, ServiceError, Step,
};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::{self, BufRead, Write};
use std::str::FromStr;

const OPTIONS: &[&str] = &[
    "1) Add a project",
    "2) List projects",
    "3) Select a project",
    "4) Update project details",
    "5) Delete a project",
    "6) Add material to current project",
    "7) Add step to current project",
    "8) Add category to current project",
    "9) List categories",
];

#[derive(Debug)]
pub enum MenuError {
    Io(io::Error),
    /// Input could not be parsed or is not allowed in the current state.
    Input(String),
    Service(ServiceError),
}

impl Display for MenuError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Input(message) => write!(f, "{message}"),
            Self::Service(err) => write!(f, "{err}"),
        }
    }
}

impl Error for MenuError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Service(err) => Some(err),
            Self::Input(_) => None,
        }
    }
}

impl From<io::Error> for MenuError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<ServiceError> for MenuError {
    fn from(value: ServiceError) -> Self {
        Self::Service(value)
    }
}

type MenuResult<T> = Result<T, MenuError>;

pub struct Menu<R: ProjectRepository, I: BufRead, O: Write> {
    service: ProjectService<R>,
    input: I,
    output: O,
    current: Option<Project>,
}

impl<R: ProjectRepository, I: BufRead, O: Write> Menu<R, I, O> {
    pub fn new(service: ProjectService<R>, input: I, output: O) -> Self {
        Self {
            service,
            input,
            output,
            current: None,
        }
    }

    /// Runs until the user quits. Only I/O failures end the loop early.
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            self.print_options()?;
            let selection = match self.read_int("Enter a menu selection") {
                Ok(Some(selection)) => selection,
                Ok(None) => {
                    writeln!(self.output, "Exiting menu.")?;
                    return Ok(());
                }
                Err(MenuError::Io(err)) => return Err(err),
                Err(err) => {
                    writeln!(self.output, "\nError: {err} Please try again.")?;
                    continue;
                }
            };

            debug!("event=menu_selection module=cli status=start selection={selection}");
            match self.dispatch(selection) {
                Ok(()) => {}
                Err(MenuError::Io(err)) => return Err(err),
                Err(err) => writeln!(self.output, "\nError: {err} Please try again.")?,
            }
        }
    }

    fn dispatch(&mut self, selection: i32) -> MenuResult<()> {
        match selection {
            1 => self.create_project(),
            2 => self.list_projects(),
            3 => self.select_project(),
            4 => self.update_project_details(),
            5 => self.delete_project(),
            6 => self.add_material(),
            7 => self.add_step(),
            8 => self.add_category(),
            9 => self.list_categories(),
            other => {
                writeln!(self.output, "\n{other} is not a valid selection.")?;
                Ok(())
            }
        }
    }

    fn create_project(&mut self) -> MenuResult<()> {
        let mut project = Project::new(self.require_string("Enter the project name")?);
        project.estimated_hours = self.read_decimal("Enter the estimated hours")?;
        project.actual_hours = self.read_decimal("Enter the actual hours")?;
        project.difficulty = self.read_difficulty("Enter the project difficulty (1-5)")?;
        project.notes = self.read_string("Enter the project notes")?;

        let created = self.service.add_project(project)?;
        writeln!(
            self.output,
            "You have successfully created project {}: {}",
            created.project_id.unwrap_or_default(),
            created.project_name
        )?;
        Ok(())
    }

    fn list_projects(&mut self) -> MenuResult<()> {
        let projects = self.service.fetch_all_projects()?;
        writeln!(self.output, "\nProjects:")?;
        for project in projects {
            writeln!(
                self.output,
                "   {}: {}",
                project.project_id.unwrap_or_default(),
                project.project_name
            )?;
        }
        Ok(())
    }

    fn select_project(&mut self) -> MenuResult<()> {
        self.list_projects()?;
        let project_id = self.require_id("Enter a project ID to select a project")?;
        self.current = None;
        let project = self.service.fetch_project_by_id(project_id)?;
        self.current = Some(project);
        self.print_current()?;
        Ok(())
    }

    fn update_project_details(&mut self) -> MenuResult<()> {
        let mut project = self.require_current()?.clone();

        let prompt = format!("Enter the project name [{}]", project.project_name);
        if let Some(name) = self.read_string(&prompt)? {
            project.project_name = name;
        }
        let prompt = format!(
            "Enter the estimated hours [{}]",
            display_or_blank(project.estimated_hours)
        );
        if let Some(hours) = self.read_decimal(&prompt)? {
            project.estimated_hours = Some(hours);
        }
        let prompt = format!(
            "Enter the actual hours [{}]",
            display_or_blank(project.actual_hours)
        );
        if let Some(hours) = self.read_decimal(&prompt)? {
            project.actual_hours = Some(hours);
        }
        let prompt = format!(
            "Enter the project difficulty (1-5) [{}]",
            display_or_blank(project.difficulty)
        );
        if let Some(difficulty) = self.read_difficulty(&prompt)? {
            project.difficulty = Some(difficulty);
        }
        let prompt = format!(
            "Enter the project notes [{}]",
            project.notes.as_deref().unwrap_or("")
        );
        if let Some(notes) = self.read_string(&prompt)? {
            project.notes = Some(notes);
        }

        self.service.modify_project_details(&project)?;
        self.reload_current()
    }

    fn delete_project(&mut self) -> MenuResult<()> {
        self.list_projects()?;
        let project_id = self.require_id("Enter the ID of a project to delete")?;
        self.service.delete_project(project_id)?;
        writeln!(self.output, "Project {project_id} was deleted successfully.")?;

        if self.current.as_ref().and_then(|p| p.project_id) == Some(project_id) {
            self.current = None;
        }
        Ok(())
    }

    fn add_material(&mut self) -> MenuResult<()> {
        let project_id = self.current_id()?;
        let name = self.require_string("Enter the material name")?;
        let num_required = self.read_parsed::<i32>("Enter the number required")?;
        let cost = self.read_decimal("Enter the cost")?;

        let material = Material::new(name, num_required, cost);
        self.service.add_material_to_project(project_id, &material)?;
        self.reload_current()
    }

    fn add_step(&mut self) -> MenuResult<()> {
        let project_id = self.current_id()?;
        let text = self.require_string("Enter the step text")?;
        let next_order = self
            .require_current()?
            .steps
            .iter()
            .map(|step| step.step_order)
            .max()
            .unwrap_or(0)
            + 1;

        self.service
            .add_step_to_project(project_id, &Step::new(text, next_order))?;
        self.reload_current()
    }

    fn add_category(&mut self) -> MenuResult<()> {
        let project_id = self.current_id()?;
        self.list_categories()?;
        let name = self.require_string("Enter a category name to add")?;
        self.service.add_category_to_project(project_id, &name)?;
        self.reload_current()
    }

    fn list_categories(&mut self) -> MenuResult<()> {
        let categories = self.service.fetch_all_categories()?;
        writeln!(self.output, "\nCategories:")?;
        for category in categories {
            writeln!(
                self.output,
                "   {}: {}",
                category.category_id, category.category_name
            )?;
        }
        Ok(())
    }

    fn reload_current(&mut self) -> MenuResult<()> {
        let project_id = self.current_id()?;
        self.current = Some(self.service.fetch_project_by_id(project_id)?);
        self.print_current()?;
        Ok(())
    }

    fn require_current(&self) -> MenuResult<&Project> {
        self.current
            .as_ref()
            .ok_or_else(|| MenuError::Input("Please select a project.".to_string()))
    }

    fn current_id(&self) -> MenuResult<ProjectId> {
        self.require_current()?
            .project_id
            .ok_or_else(|| MenuError::Input("Selected project is not saved.".to_string()))
    }

    fn print_options(&mut self) -> io::Result<()> {
        writeln!(
            self.output,
            "\nThese are the available selections. Press the Enter key to quit:"
        )?;
        for line in OPTIONS {
            writeln!(self.output, "  {line}")?;
        }
        match &self.current {
            Some(project) => writeln!(
                self.output,
                "\nYou are working with project: {}",
                project.project_name
            ),
            None => writeln!(self.output, "\nYou are not working with a project."),
        }
    }

    fn print_current(&mut self) -> io::Result<()> {
        let Some(project) = &self.current else {
            return Ok(());
        };

        writeln!(self.output, "\n   ID={}", project.project_id.unwrap_or_default())?;
        writeln!(self.output, "   name={}", project.project_name)?;
        writeln!(
            self.output,
            "   estimated hours={}",
            display_or_blank(project.estimated_hours)
        )?;
        writeln!(
            self.output,
            "   actual hours={}",
            display_or_blank(project.actual_hours)
        )?;
        writeln!(
            self.output,
            "   difficulty={}",
            display_or_blank(project.difficulty)
        )?;
        writeln!(
            self.output,
            "   notes={}",
            project.notes.as_deref().unwrap_or("")
        )?;

        writeln!(self.output, "\n   Materials:")?;
        for material in &project.materials {
            writeln!(
                self.output,
                "      {} x{} @ {}",
                material.material_name,
                display_or_blank(material.num_required),
                display_or_blank(material.cost)
            )?;
        }
        writeln!(self.output, "\n   Steps:")?;
        for step in &project.steps {
            writeln!(self.output, "      {}. {}", step.step_order, step.step_text)?;
        }
        writeln!(self.output, "\n   Categories:")?;
        for category in &project.categories {
            writeln!(self.output, "      {}", category.category_name)?;
        }
        Ok(())
    }

    /// Prompts once; blank input and end-of-input both yield `None`.
    fn read_string(&mut self, prompt: &str) -> MenuResult<Option<String>> {
        write!(self.output, "{prompt}: ")?;
        self.output.flush()?;

        let mut line = String::new();
        self.input.read_line(&mut line)?;
        let trimmed = line.trim();
        Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
    }

    fn require_string(&mut self, prompt: &str) -> MenuResult<String> {
        self.read_string(prompt)?
            .ok_or_else(|| MenuError::Input("A value is required.".to_string()))
    }

    fn read_parsed<T: FromStr>(&mut self, prompt: &str) -> MenuResult<Option<T>> {
        match self.read_string(prompt)? {
            Some(value) => value
                .parse::<T>()
                .map(Some)
                .map_err(|_| MenuError::Input(format!("{value} is not a valid number."))),
            None => Ok(None),
        }
    }

    fn read_int(&mut self, prompt: &str) -> MenuResult<Option<i32>> {
        self.read_parsed(prompt)
    }

    fn require_id(&mut self, prompt: &str) -> MenuResult<ProjectId> {
        self.read_parsed::<ProjectId>(prompt)?
            .ok_or_else(|| MenuError::Input("A project ID is required.".to_string()))
    }

    fn read_decimal(&mut self, prompt: &str) -> MenuResult<Option<Decimal2>> {
        match self.read_string(prompt)? {
            Some(value) => value
                .parse::<Decimal2>()
                .map(Some)
                .map_err(|err| MenuError::Input(format!("{err}."))),
            None => Ok(None),
        }
    }

    fn read_difficulty(&mut self, prompt: &str) -> MenuResult<Option<i32>> {
        match self.read_int(prompt)? {
            Some(value) if !(1..=5).contains(&value) => Err(MenuError::Input(format!(
                "Difficulty {value} is outside 1-5."
            ))),
            other => Ok(other),
        }
    }
}

fn display_or_blank<T: Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::Menu;
    use projects_core::{ProjectService, SqliteConnectionProvider, SqliteProjectRepository};
    use std::io::Cursor;

    fn run_script(provider: &SqliteConnectionProvider, script: &str) -> String {
        let repo = SqliteProjectRepository::try_new(provider.clone()).unwrap();
        let mut output = Vec::new();
        {
            let mut menu = Menu::new(
                ProjectService::new(repo),
                Cursor::new(script.as_bytes()),
                &mut output,
            );
            menu.run().unwrap();
        }
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn create_select_and_attach_material() {
        let dir = tempfile::tempdir().unwrap();
        let provider = SqliteConnectionProvider::new(dir.path().join("menu.sqlite3"));

        let output = run_script(
            &provider,
            "1\nDeck\n10\n0\n3\nbuild a deck\n3\n1\n6\nlumber\n20\n5.5\n\n",
        );

        assert!(output.contains("You have successfully created project 1: Deck"));
        assert!(output.contains("lumber x20 @ 5.50"));
        assert!(output.contains("You are working with project: Deck"));
        assert!(output.trim_end().ends_with("Exiting menu."));
    }

    #[test]
    fn bad_input_reports_error_and_keeps_running() {
        let dir = tempfile::tempdir().unwrap();
        let provider = SqliteConnectionProvider::new(dir.path().join("menu.sqlite3"));

        let output = run_script(&provider, "abc\n42\n1\nShed\n1.234\n6\n3\n7\n\n");

        assert!(output.contains("Error: abc is not a valid number."));
        assert!(output.contains("42 is not a valid selection."));
        assert!(output.contains("more than 2 decimal places"));
        assert!(output.contains("Error: Please select a project."));
        assert!(output.contains("project number 7 does not exist"));
        assert!(output.contains("Exiting menu."));
    }

    #[test]
    fn names_are_trimmed_and_blank_names_refused() {
        let dir = tempfile::tempdir().unwrap();
        let provider = SqliteConnectionProvider::new(dir.path().join("menu.sqlite3"));

        let output = run_script(&provider, "1\n   \n1\n  Shed  \n\n\n\n\n\n");

        assert!(output.contains("Error: A value is required."));
        assert!(output.contains("You have successfully created project 1: Shed"));
    }

    #[test]
    fn end_of_input_exits_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let provider = SqliteConnectionProvider::new(dir.path().join("menu.sqlite3"));

        let output = run_script(&provider, "2\n");
        assert!(output.contains("Projects:"));
        assert!(output.contains("Exiting menu."));
    }
}
