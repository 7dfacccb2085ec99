// Pure functions over extracted resume text: sections, skills, entities.

pub mod entities;
pub mod sections;
pub mod skills;
