use chrono::NaiveDateTime;

use super::{same_identity, Entity};

#[derive(Debug, Clone)]
pub struct PhotoComment {
    id: Option<i64>,
    pub text: String,
    pub created_on: NaiveDateTime,
    photo_id: Option<i64>,
}

impl PhotoComment {
    pub fn new(text: impl Into<String>, created_on: NaiveDateTime) -> Self {
        Self {
            id: None,
            text: text.into(),
            created_on,
            photo_id: None,
        }
    }

    /// Identifier of the photo this comment belongs to.
    pub fn photo_id(&self) -> Option<i64> {
        self.photo_id
    }

    pub(crate) fn set_photo_id(&mut self, photo_id: Option<i64>) {
        self.photo_id = photo_id;
    }
}

impl Entity for PhotoComment {
    const NAME: &'static str = "photo comment";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }
}

impl PartialEq for PhotoComment {
    fn eq(&self, other: &Self) -> bool {
        same_identity(self.id, other.id)
    }
}

/// A photo owning its comments.
///
/// Comments are saved and removed together with the photo.
#[derive(Debug, Clone)]
pub struct Photo {
    id: Option<i64>,
    pub url: String,
    pub description: Option<String>,
    comments: Vec<PhotoComment>,
}

impl Photo {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            id: None,
            url: url.into(),
            description: None,
            comments: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.set_id(id);
        self
    }

    pub fn comments(&self) -> &[PhotoComment] {
        &self.comments
    }

    pub fn add_comment(&mut self, mut comment: PhotoComment) {
        comment.set_photo_id(self.id);
        self.comments.push(comment);
    }

    pub fn remove_comment(&mut self, comment_id: i64) -> Option<PhotoComment> {
        let index = self
            .comments
            .iter()
            .position(|comment| comment.id() == Some(comment_id))?;
        let mut comment = self.comments.remove(index);
        comment.set_photo_id(None);
        Some(comment)
    }

    pub(crate) fn comments_mut(&mut self) -> &mut [PhotoComment] {
        &mut self.comments
    }
}

impl Entity for Photo {
    const NAME: &'static str = "photo";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
        for comment in &mut self.comments {
            comment.set_photo_id(Some(id));
        }
    }
}

impl PartialEq for Photo {
    fn eq(&self, other: &Self) -> bool {
        same_identity(self.id, other.id)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2019, 8, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn comments_follow_the_photo_identifier() {
        let mut photo = Photo::new("https://photos.example/1.png");
        photo.add_comment(PhotoComment::new("Nice!", noon()));
        assert_eq!(photo.comments()[0].photo_id(), None);

        photo.set_id(9);

        assert_eq!(photo.comments()[0].photo_id(), Some(9));
    }

    #[test]
    fn remove_comment_detaches_it() {
        let mut photo = Photo::new("https://photos.example/2.png").with_id(1);
        let mut comment = PhotoComment::new("Wow", noon());
        comment.set_id(4);
        photo.add_comment(comment);

        let removed = photo.remove_comment(4).unwrap();

        assert_eq!(removed.photo_id(), None);
        assert!(photo.comments().is_empty());
    }
}
