//! Clients of the asset library routes: materials, projects, reference files and user templates.

mod files;
mod materials;
mod projects;
mod templates;
