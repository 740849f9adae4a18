use clap::Args;
use storefront_app::context::StorefrontContext;

use super::render;

#[derive(Debug, Args)]
pub(crate) struct LoginArgs {
    /// URL the login page redirected to, carrying `?token=`
    redirect: String,
}

pub(crate) fn login(context: &StorefrontContext, args: &LoginArgs) -> Result<(), String> {
    context
        .session
        .login_from_redirect(&args.redirect)
        .map_err(|error| format!("failed to log in: {}", render::describe(&error)))?;

    println!("logged in");

    Ok(())
}

pub(crate) fn logout(context: &StorefrontContext) -> Result<(), String> {
    context
        .session
        .logout()
        .map_err(|error| format!("failed to log out: {}", render::describe(&error)))?;

    println!("logged out");

    Ok(())
}
