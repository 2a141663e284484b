// ACL grant inspection
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use aws_sdk_s3::types::{
    Grant,
    Permission,
    Type,
};

/// The well-known URI of the anonymous AllUsers group.
pub const ALL_USERS_URI: &str = "http://acs.amazonaws.com/groups/global/AllUsers";

/// Returns `true` if the given grant is a READ grant to the AllUsers group.
///
/// This is deliberately the single highest-severity public-read case. Write
/// grants to AllUsers, or grants to the authenticated-users group, are not
/// reported here.
pub fn grant_is_public_read(grant: &Grant) -> bool {
    let Some(grantee) = grant.grantee() else {
        return false;
    };

    grantee.r#type() == &Type::Group
        && grantee.uri() == Some(ALL_USERS_URI)
        && grant.permission() == Some(&Permission::Read)
}
