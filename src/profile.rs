use serde::Deserialize;
use std::{
    fs, io,
    path::Path,
    sync::{Arc, LazyLock},
};
use thiserror::Error;

static INBUILT_PROFILES: LazyLock<Vec<Arc<Profile>>> = LazyLock::new(|| {
    ProfileSet::parse(include_str!("profile/inbuilt.toml"))
        .expect("Failed to parse inbuilt profiles")
        .profiles
});

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Failed to read profile file")]
    Read(#[from] io::Error),
    #[error("Failed to parse profile file")]
    Parse(#[from] toml::de::Error),
}

/// Describes which files hold a kind of compressed asset and what they
/// should decode to.
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub name: String,

    pub extension: String,
    /// substrings that must all appear in the path relative to the scanned directory
    #[serde(default)]
    pub name_contains: Vec<String>,

    /// exact decoded size every matching asset must have
    #[serde(default)]
    pub decoded_len: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileSet {
    pub profiles: Vec<Arc<Profile>>,
}

#[derive(Deserialize)]
struct ProfileFile {
    #[serde(rename = "profile", default)]
    profiles: Vec<Profile>,
}

impl ProfileSet {
    pub fn parse(src: &str) -> Result<Self, toml::de::Error> {
        let file: ProfileFile = toml::de::from_str(src)?;

        Ok(Self {
            profiles: file.profiles.into_iter().map(Arc::new).collect(),
        })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ProfileError> {
        let src = fs::read_to_string(path.as_ref())?;
        Ok(Self::parse(&src)?)
    }

    pub fn inbuilt() -> &'static [Arc<Profile>] {
        &INBUILT_PROFILES
    }
}

impl Profile {
    /// Look a profile up by name, inbuilt profiles first.
    pub fn find(name: &str, additional: &ProfileSet) -> Option<Arc<Profile>> {
        INBUILT_PROFILES
            .iter()
            .chain(additional.profiles.iter())
            .find(|profile| profile.name == name)
            .cloned()
    }

    /// `path` should be relative to the asset root, so directories above it
    /// never satisfy `name_contains`.
    pub fn matches(&self, path: &Path) -> bool {
        let extension_matches = path
            .extension()
            .and_then(|extension| extension.to_str())
            .is_some_and(|extension| extension.eq_ignore_ascii_case(&self.extension));

        if !extension_matches {
            return false;
        }

        let path = path.to_string_lossy();
        self.name_contains
            .iter()
            .all(|needle| path.contains(needle.as_str()))
    }

    pub fn check_len(&self, len: usize) -> bool {
        self.decoded_len
            .map_or(true, |expected| expected as usize == len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inbuilt_avatar_profile() {
        let avatar = Profile::find("avatar", &ProfileSet::default()).unwrap();

        assert_eq!(avatar.decoded_len, Some(256 * 256 * 4));
        assert!(avatar.matches(Path::new("romfs/chara/chr_01.szs")));
        assert!(avatar.matches(Path::new("romfs/chara/chr_01.SZS")));
        assert!(!avatar.matches(Path::new("romfs/chara/chr_01.bin")));
        assert!(!avatar.matches(Path::new("romfs/bg/bg_01.szs")));

        assert!(avatar.check_len(262144));
        assert!(!avatar.check_len(1024));
    }

    #[test]
    fn additional_profiles_are_searched_after_inbuilt() {
        let set = ProfileSet::parse(
            r#"
            [[profile]]
            name = "avatar"
            extension = "yaz0"

            [[profile]]
            name = "icons"
            extension = "szs"
            name_contains = ["icon", "64"]
            decoded_len = 16384
            "#,
        )
        .unwrap();

        assert_eq!(Profile::find("avatar", &set).unwrap().extension, "szs");

        let icons = Profile::find("icons", &set).unwrap();
        assert!(icons.matches(Path::new("icon_64.szs")));
        assert!(!icons.matches(Path::new("icon_32.szs")));
        assert!(Profile::find("missing", &set).is_none());
    }

    #[test]
    fn profile_without_size_accepts_anything() {
        let any = Profile::find("any", &ProfileSet::default()).unwrap();
        assert!(any.check_len(0));
        assert!(any.check_len(12345));
    }

    #[test]
    fn invalid_profile_file() {
        assert!(ProfileSet::parse("[[profile]]\nname = 3").is_err());

        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            ProfileSet::load(missing),
            Err(ProfileError::Read(_))
        ));
    }
}
