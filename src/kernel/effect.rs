use crate::models::ChangeSet;

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    FetchPage(u32),
    SubmitChanges(ChangeSet),
}
