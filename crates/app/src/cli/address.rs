use clap::{Args, Subcommand};
use storefront::address::{AddressField, DeliveryAddress};
use storefront_app::context::StorefrontContext;

use super::render;

#[derive(Debug, Args)]
pub(crate) struct AddressCommand {
    #[command(subcommand)]
    command: AddressSubcommand,
}

#[derive(Debug, Subcommand)]
enum AddressSubcommand {
    /// Show the default delivery address from the profile
    Show,
    /// Change address fields and save them as the default
    Set(FieldArgs),
}

#[derive(Debug, Args)]
pub(crate) struct FieldArgs {
    /// Address fields as `field=value` (door_no, street, city, landmark,
    /// pincode, phone)
    #[arg(value_parser = parse_field, required = true)]
    pub(crate) fields: Vec<(AddressField, String)>,
}

pub(crate) async fn run(
    context: &StorefrontContext,
    command: &AddressCommand,
) -> Result<(), String> {
    let checkout = &context.checkout;

    if !context.session.is_logged_in() {
        return Err(storefront_app::checkout::NOT_LOGGED_IN.to_string());
    }

    checkout.load_profile().await;

    if let AddressSubcommand::Set(args) = &command.command {
        fill_draft(context, &args.fields).await;

        checkout
            .save_address()
            .await
            .map_err(|error| render::describe(&error))?;

        println!("address saved");
    }

    print_address(checkout.state().await.addresses.default_address());

    Ok(())
}

/// Open the editor and apply `fields` to the draft.
pub(crate) async fn fill_draft(context: &StorefrontContext, fields: &[(AddressField, String)]) {
    context.checkout.edit_address().await;

    for (field, value) in fields {
        context.checkout.update_address(*field, value.as_str()).await;
    }
}

fn print_address(address: &DeliveryAddress) {
    for field in AddressField::ALL {
        println!("{field}: {}", address.get(field));
    }
}

pub(crate) fn parse_field(raw: &str) -> Result<(AddressField, String), String> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected field=value, got `{raw}`"))?;

    let field = field
        .parse::<AddressField>()
        .map_err(|error| error.to_string())?;

    Ok((field, value.trim().to_string()))
}
