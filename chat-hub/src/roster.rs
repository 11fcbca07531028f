/// Ordered list of the usernames currently logged in. Owned by the hub;
/// everything outside its control loop only ever sees snapshots carried
/// on events.
#[derive(Debug, Default)]
pub struct Roster {
    users: Vec<String>,
}

impl Roster {
    pub fn new() -> Self {
        Roster::default()
    }

    /// Appends at the end. Duplicate usernames are tolerated and co-exist
    /// until each one individually logs out.
    pub fn add(&mut self, username: String) {
        self.users.push(username);
    }

    /// Removes the first occurrence only. An absent username is a no-op.
    pub fn remove(&mut self, username: &str) {
        if let Some(position) = self.users.iter().position(|user| user == username) {
            self.users.remove(position);
        }
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.users.clone()
    }
}
