use chrono::{SubsecRound, Utc};
use tracing::debug;

use super::{ensure_affected, not_found, require_id, CrudDao, Statements, Table};
use crate::error::DaoResult;
use crate::handle::{ResourceFactory, ResourceHandle};
use crate::mapper::{generated_key, Column, Kind, Row, RowMapper, Value, ID, KEY_COLUMNS};
use crate::model::{Entity, Photo, PhotoComment};
use crate::unit_of_work::UnitOfWork;

pub struct PhotoMapper;

pub struct PhotoCommentMapper;

const INSERT_COMMENT: &str =
    "INSERT INTO photo_comment (text, created_on, photo_id) VALUES ($1, $2, $3) RETURNING id";
const SELECT_COMMENTS: &str =
    "SELECT id, text, created_on, photo_id FROM photo_comment WHERE photo_id = $1 ORDER BY id";
const DELETE_COMMENTS: &str = "DELETE FROM photo_comment WHERE photo_id = $1";

impl RowMapper for PhotoMapper {
    type Entity = Photo;

    const COLUMNS: &'static [Column] = &[
        Column::new(ID, Kind::Int),
        Column::new("url", Kind::Text),
        Column::new("description", Kind::Text),
    ];

    fn to_entity(row: &Row) -> DaoResult<Photo> {
        let mut photo = Photo::new(row.required::<String>("url")?).with_id(row.required(ID)?);
        photo.description = row.optional("description")?;
        Ok(photo)
    }

    fn bind_parameters(photo: &Photo) -> Vec<Value> {
        vec![
            Value::from(photo.url.as_str()),
            Value::nullable(photo.description.as_deref(), Kind::Text),
        ]
    }
}

impl Table for PhotoMapper {
    const STATEMENTS: Statements = Statements {
        insert: "INSERT INTO photo (url, description) VALUES ($1, $2) RETURNING id",
        select_all: "SELECT id, url, description FROM photo ORDER BY id",
        select_by_id: "SELECT id, url, description FROM photo WHERE id = $1",
        update: "UPDATE photo SET url = $1, description = $2 WHERE id = $3",
        delete: "DELETE FROM photo WHERE id = $1",
        count: "SELECT COUNT(*) AS count FROM photo",
    };
}

impl RowMapper for PhotoCommentMapper {
    type Entity = PhotoComment;

    const COLUMNS: &'static [Column] = &[
        Column::new(ID, Kind::Int),
        Column::new("text", Kind::Text),
        Column::new("created_on", Kind::Timestamp),
        Column::new("photo_id", Kind::Int),
    ];

    fn to_entity(row: &Row) -> DaoResult<PhotoComment> {
        let mut comment = PhotoComment::new(
            row.required::<String>("text")?,
            row.required("created_on")?,
        );
        comment.set_id(row.required(ID)?);
        comment.set_photo_id(Some(row.required("photo_id")?));
        Ok(comment)
    }

    fn bind_parameters(comment: &PhotoComment) -> Vec<Value> {
        vec![
            Value::from(comment.text.as_str()),
            Value::from(comment.created_on),
            Value::nullable(comment.photo_id(), Kind::Int),
        ]
    }
}

/// Photos with their comments.
///
/// Comments are cascaded: saving a photo inserts its attached comments and
/// removing it deletes them, each within the photo's transaction.
pub struct PhotoDao<F> {
    photos: CrudDao<F, PhotoMapper>,
}

impl<F: Clone> Clone for PhotoDao<F> {
    fn clone(&self) -> Self {
        Self {
            photos: self.photos.clone(),
        }
    }
}

impl<F: ResourceFactory> PhotoDao<F> {
    pub fn new(uow: UnitOfWork<F>) -> Self {
        Self {
            photos: CrudDao::new(uow),
        }
    }

    fn uow(&self) -> &UnitOfWork<F> {
        self.photos.unit_of_work()
    }

    /// Insert the photo and its comments, then assign every generated
    /// identifier once the transaction has committed.
    pub async fn save(&self, photo: &mut Photo) -> DaoResult<()> {
        let params = PhotoMapper::bind_parameters(photo);
        let comments = photo.comments().to_vec();
        let (photo_id, comment_ids) = self
            .uow()
            .execute(move |handle| {
                Box::pin(async move {
                    let rows = handle
                        .query(PhotoMapper::STATEMENTS.insert, &params, KEY_COLUMNS)
                        .await?;
                    let photo_id = generated_key::<Photo>(&rows)?;

                    let mut comment_ids = Vec::with_capacity(comments.len());
                    for mut comment in comments {
                        comment.set_photo_id(Some(photo_id));
                        comment_ids.push(insert_comment(handle, &comment).await?);
                    }
                    Ok((photo_id, comment_ids))
                })
            })
            .await?;

        photo.set_id(photo_id);
        for (comment, id) in photo.comments_mut().iter_mut().zip(comment_ids) {
            comment.set_id(id);
        }
        debug!(entity = Photo::NAME, id = photo_id, "saved");
        Ok(())
    }

    /// Loads a photo together with its comments.
    pub async fn find_by_id(&self, id: i64) -> DaoResult<Photo> {
        self.uow()
            .execute(move |handle| {
                Box::pin(async move {
                    let params = [Value::Int(id)];
                    let rows = handle
                        .query(PhotoMapper::STATEMENTS.select_by_id, &params, PhotoMapper::COLUMNS)
                        .await?;
                    let mut photo = match rows.first() {
                        Some(row) => PhotoMapper::to_entity(row)?,
                        None => return Err(not_found::<Photo>(id)),
                    };

                    let comment_rows = handle
                        .query(SELECT_COMMENTS, &params, PhotoCommentMapper::COLUMNS)
                        .await?;
                    for comment in PhotoCommentMapper::to_entities(&comment_rows)? {
                        photo.add_comment(comment);
                    }
                    Ok(photo)
                })
            })
            .await
    }

    /// All photos, without their comments.
    pub async fn find_all(&self) -> DaoResult<Vec<Photo>> {
        self.photos.find_all().await
    }

    /// Rewrites url and description; comments are left untouched.
    pub async fn update(&self, photo: &Photo) -> DaoResult<()> {
        self.photos.update(photo).await
    }

    /// Delete the photo and all of its comments.
    pub async fn remove(&self, photo: &Photo) -> DaoResult<()> {
        let id = require_id(photo, "remove")?;
        self.uow()
            .execute_void(move |handle| {
                Box::pin(async move {
                    let params = [Value::Int(id)];
                    handle.execute(DELETE_COMMENTS, &params).await?;
                    let affected = handle
                        .execute(PhotoMapper::STATEMENTS.delete, &params)
                        .await?;
                    ensure_affected::<Photo>(affected, id)
                })
            })
            .await?;
        debug!(entity = Photo::NAME, id, "removed");
        Ok(())
    }

    /// Attach a new comment to a stored photo, stamped with the current time.
    pub async fn add_comment(&self, photo_id: i64, text: &str) -> DaoResult<PhotoComment> {
        let mut comment = PhotoComment::new(text, Utc::now().naive_utc().trunc_subsecs(6));
        comment.set_photo_id(Some(photo_id));
        let pending = comment.clone();

        let id = self
            .uow()
            .execute(move |handle| {
                Box::pin(async move {
                    let photo_rows = handle
                        .query(
                            PhotoMapper::STATEMENTS.select_by_id,
                            &[Value::Int(photo_id)],
                            KEY_COLUMNS,
                        )
                        .await?;
                    if photo_rows.is_empty() {
                        return Err(not_found::<Photo>(photo_id));
                    }
                    insert_comment(handle, &pending).await
                })
            })
            .await?;

        comment.set_id(id);
        Ok(comment)
    }

    pub async fn count(&self) -> DaoResult<i64> {
        self.photos.count().await
    }
}

async fn insert_comment(handle: &mut dyn ResourceHandle, comment: &PhotoComment) -> DaoResult<i64> {
    let rows = handle
        .query(
            INSERT_COMMENT,
            &PhotoCommentMapper::bind_parameters(comment),
            KEY_COLUMNS,
        )
        .await?;
    generated_key::<PhotoComment>(&rows)
}
